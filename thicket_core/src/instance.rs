//! Running copy of a tree asset.
//!
//! The instance mirrors the asset's node arena with runtime slots, one per
//! node, holding what changes while the tree runs: the last state, whether
//! the node was entered, cursors and counters of control nodes, timers of
//! decorators, the cloned action and nested subtree instances.

use crate::action::{Action, ActionContext};
use crate::asset::TreeAsset;
use crate::clock::{Clock, SystemClock};
use crate::error::StructuralError;
use crate::node::{DecoratorPolicy, NodeDef, NodeKind, ParallelPolicy};
use crate::owner::{Agent, Owner};
use crate::store::{Blackboard, GlobalStore, Var, VariableStore};
use crate::as_any::AsAnyHelper;
use crate::{InstanceId, NodeId, NodeState, NodeStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything outside the tree an instance talks to.
#[derive(Clone, Debug)]
pub struct Environment {
    pub owner: Arc<dyn Owner>,
    pub globals: GlobalStore,
    pub clock: Arc<dyn Clock>,
}

impl Environment {
    pub fn new(owner: Arc<dyn Owner>, globals: GlobalStore, clock: Arc<dyn Clock>) -> Self {
        Environment {
            owner,
            globals,
            clock,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(
            Arc::new(Agent::new("anonymous")),
            GlobalStore::default(),
            Arc::new(SystemClock::new()),
        )
    }
}

#[derive(Debug)]
enum Runtime {
    Control,
    Condition(Option<Var<bool>>),
    Action {
        action: Box<dyn Action>,
        disabled: bool,
        entry_failed: bool,
    },
    Subtree(Box<TreeInstance>),
}

#[derive(Debug)]
struct Slot {
    state: NodeState,
    started: bool,
    mute: bool,
    /// Active child of sequence and selector.
    cursor: usize,
    /// Successes for repeat, failures for retry.
    counter: u32,
    entered_at: f64,
    last_completed: Option<f64>,
    /// Children of a parallel that finished during this activation.
    finished: Vec<(NodeId, NodeStatus)>,
    runtime: Runtime,
}

impl Slot {
    fn new(def: &NodeDef) -> Self {
        Slot {
            state: NodeState::Invalid,
            started: false,
            mute: def.mute(),
            cursor: 0,
            counter: 0,
            entered_at: 0.0,
            last_completed: None,
            finished: vec![],
            runtime: Runtime::Control,
        }
    }
}

/// State of one node, as reported by [`TreeInstance::snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub kind: String,
    pub state: NodeState,
    pub running: bool,
    pub mute: bool,
    pub disabled: bool,
}

/// A tree asset bound to one owner, ready to be ticked.
///
/// Dropping an instance halts it, so running actions always see their
/// `on_exit`.
#[derive(Debug)]
pub struct TreeInstance {
    id: InstanceId,
    asset: Arc<TreeAsset>,
    slots: Vec<Slot>,
    locals: VariableStore,
    env: Environment,
    ticks: u64,
    status: Option<NodeStatus>,
}

impl TreeInstance {
    /// Create the runtime state and initialize every reachable action once.
    pub fn new(asset: Arc<TreeAsset>, env: Environment) -> Result<Self, StructuralError> {
        let locals = VariableStore::from_decls(asset.variables())?;
        {
            let globals = env.globals.read();
            for local in locals.iter() {
                if let Some(global) = globals.variable(local.name()) {
                    if global.variable_type() != local.variable_type() {
                        return Err(StructuralError::ScopeConflict {
                            name: local.name().to_owned(),
                            local: local.variable_type().clone(),
                            global: global.variable_type().clone(),
                        });
                    }
                }
            }
        }

        let slots = asset.nodes().iter().map(Slot::new).collect();
        let mut instance = TreeInstance {
            id: InstanceId::new(),
            asset,
            slots,
            locals,
            env,
            ticks: 0,
            status: None,
        };
        instance.initialize()?;
        tracing::info!(
            tree = instance.asset.name(),
            instance = %instance.id,
            owner = instance.env.owner.name(),
            nodes = instance.slots.len(),
            "created tree instance"
        );
        Ok(instance)
    }

    fn initialize(&mut self) -> Result<(), StructuralError> {
        let asset = self.asset.clone();
        let mut stack = vec![asset.root()];
        while let Some(id) = stack.pop() {
            let def = asset.def(id);
            stack.extend(def.children().iter().rev());
            match def.kind() {
                NodeKind::Action(prototype) => {
                    self.slots[id.0].runtime = Runtime::Action {
                        action: prototype.clone(),
                        disabled: false,
                        entry_failed: false,
                    };
                    let result = self.with_action(id, def.name(), |a, ctx| a.on_initialize(ctx));
                    if let Some(Err(e)) = result {
                        tracing::warn!(
                            tree = asset.name(),
                            node = def.name(),
                            error = %e,
                            "initialization failed, node disabled"
                        );
                        if let Runtime::Action { disabled, .. } = &mut self.slots[id.0].runtime {
                            *disabled = true;
                        }
                    }
                }
                NodeKind::Subtree(sub) => {
                    let inner = TreeInstance::new(sub.clone(), self.env.clone())?;
                    self.slots[id.0].runtime = Runtime::Subtree(Box::new(inner));
                }
                NodeKind::Decorator(DecoratorPolicy::Conditional { variable }) => {
                    let blackboard = Blackboard::new(&mut self.locals, &self.env.globals);
                    let var = match blackboard.bind::<bool>(variable) {
                        Ok(v) => Some(v),
                        Err(e) => {
                            tracing::warn!(
                                tree = asset.name(),
                                node = def.name(),
                                error = %e,
                                "condition variable unavailable"
                            );
                            None
                        }
                    };
                    self.slots[id.0].runtime = Runtime::Condition(var);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Tick the root once and return the status of the tree, a muted root
    /// reports Failure.
    pub fn tick(&mut self) -> NodeStatus {
        let span = tracing::trace_span!("tick", tree = self.asset.name(), instance = %self.id);
        let _guard = span.enter();
        self.ticks += 1;
        let root = self.asset.root();
        let status = if self.slots[root.0].mute {
            NodeStatus::Failure
        } else {
            self.tick_node(root)
        };
        self.status = Some(status);
        tracing::trace!(?status, tick = self.ticks, "tick done");
        status
    }

    /// Interrupt everything that is running, calling `on_exit` bottom up.
    pub fn halt(&mut self) {
        self.halt_node(self.asset.root());
    }

    /// Mute or unmute a node, a running node is halted first.
    pub fn set_mute(&mut self, id: NodeId, mute: bool) -> Result<(), StructuralError> {
        if id.0 >= self.slots.len() {
            return Err(StructuralError::UnknownNode(id));
        }
        if mute {
            self.halt_node(id);
        }
        self.slots[id.0].mute = mute;
        Ok(())
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn asset(&self) -> &Arc<TreeAsset> {
        &self.asset
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Status of the last tick, `None` before the first.
    pub fn status(&self) -> Option<NodeStatus> {
        self.status
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn node_state(&self, id: NodeId) -> Option<NodeState> {
        self.slots.get(id.0).map(|s| s.state)
    }

    pub fn is_running(&self, id: NodeId) -> bool {
        self.slots.get(id.0).map(|s| s.started).unwrap_or(false)
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        matches!(
            self.slots.get(id.0).map(|s| &s.runtime),
            Some(Runtime::Action { disabled: true, .. })
        )
    }

    pub fn locals(&self) -> &VariableStore {
        &self.locals
    }

    pub fn locals_mut(&mut self) -> &mut VariableStore {
        &mut self.locals
    }

    pub fn globals(&self) -> &GlobalStore {
        &self.env.globals
    }

    /// The nested instance of a subtree node.
    pub fn subtree(&self, id: NodeId) -> Option<&TreeInstance> {
        match &self.slots.get(id.0)?.runtime {
            Runtime::Subtree(inner) => Some(&**inner),
            _ => None,
        }
    }

    pub fn subtree_mut(&mut self, id: NodeId) -> Option<&mut TreeInstance> {
        match &mut self.slots.get_mut(id.0)?.runtime {
            Runtime::Subtree(inner) => Some(&mut **inner),
            _ => None,
        }
    }

    /// The action of a node, if it is of type `A`.
    pub fn action<A: Action + 'static>(&self, id: NodeId) -> Option<&A> {
        match &self.slots.get(id.0)?.runtime {
            Runtime::Action { action, .. } => (**action).downcast_ref::<A>(),
            _ => None,
        }
    }

    pub fn action_mut<A: Action + 'static>(&mut self, id: NodeId) -> Option<&mut A> {
        match &mut self.slots.get_mut(id.0)?.runtime {
            Runtime::Action { action, .. } => (**action).downcast_mut::<A>(),
            _ => None,
        }
    }

    /// Per node state in arena order.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.asset
            .ids()
            .map(|id| {
                let def = self.asset.def(id);
                let slot = &self.slots[id.0];
                NodeSnapshot {
                    id,
                    name: def.name().to_owned(),
                    kind: def.kind().label().to_owned(),
                    state: slot.state,
                    running: slot.started,
                    mute: slot.mute,
                    disabled: self.is_disabled(id),
                }
            })
            .collect()
    }

    fn with_action<R>(
        &mut self,
        id: NodeId,
        name: &str,
        f: impl FnOnce(&mut dyn Action, &mut ActionContext) -> R,
    ) -> Option<R> {
        let TreeInstance {
            slots, locals, env, ..
        } = self;
        let Runtime::Action { action, .. } = &mut slots[id.0].runtime else {
            return None;
        };
        let blackboard = Blackboard::new(locals, &env.globals);
        let mut ctx = ActionContext::new(id, name, &*env.owner, &*env.clock, blackboard);
        Some(f(action.as_mut(), &mut ctx))
    }

    fn effective_child(&self, def: &NodeDef) -> Option<NodeId> {
        def.children()
            .first()
            .copied()
            .filter(|c| !self.slots[c.0].mute)
    }

    fn tick_node(&mut self, id: NodeId) -> NodeStatus {
        let asset = self.asset.clone();
        let def = asset.def(id);
        if let Runtime::Action { disabled: true, .. } = self.slots[id.0].runtime {
            tracing::trace!(node = def.name(), "disabled");
            self.slots[id.0].state = NodeState::Failure;
            return NodeStatus::Failure;
        }
        if !self.slots[id.0].started {
            self.enter(id, def);
        }

        let status = match def.kind() {
            NodeKind::Root => match self.effective_child(def) {
                Some(child) => self.tick_node(child),
                None => NodeStatus::Failure,
            },
            NodeKind::Sequence => {
                self.tick_ordered(id, def.children(), NodeStatus::Success, NodeStatus::Success)
            }
            NodeKind::Selector => {
                self.tick_ordered(id, def.children(), NodeStatus::Failure, NodeStatus::Failure)
            }
            NodeKind::Parallel(policy) => self.tick_parallel(id, def.children(), policy),
            NodeKind::Decorator(policy) => self.tick_decorator(id, def, policy),
            NodeKind::Action(_) => self.update_action(id, def),
            NodeKind::Subtree(_) => match &mut self.slots[id.0].runtime {
                Runtime::Subtree(inner) => inner.tick(),
                _ => NodeStatus::Failure,
            },
        };

        self.slots[id.0].state = status.into();
        if status.is_terminal() {
            self.exit(id, def);
        }
        status
    }

    fn enter(&mut self, id: NodeId, def: &NodeDef) {
        let now = self.env.clock.now();
        let slot = &mut self.slots[id.0];
        slot.started = true;
        slot.cursor = 0;
        slot.counter = 0;
        slot.finished.clear();
        slot.entered_at = now;
        tracing::debug!(node = def.name(), kind = def.kind().label(), "enter");

        if let Some(Err(e)) = self.with_action(id, def.name(), |a, ctx| a.on_entry(ctx)) {
            tracing::warn!(node = def.name(), error = %e, "entry failed");
            if let Runtime::Action { entry_failed, .. } = &mut self.slots[id.0].runtime {
                *entry_failed = true;
            }
        }
    }

    fn exit(&mut self, id: NodeId, def: &NodeDef) {
        self.slots[id.0].started = false;
        self.slots[id.0].finished.clear();
        let is_action = match &mut self.slots[id.0].runtime {
            Runtime::Action { entry_failed, .. } => {
                *entry_failed = false;
                true
            }
            Runtime::Subtree(inner) => {
                inner.halt();
                false
            }
            _ => false,
        };
        if is_action {
            self.with_action(id, def.name(), |a, ctx| a.on_exit(ctx));
        }
        tracing::debug!(node = def.name(), state = ?self.slots[id.0].state, "exit");
    }

    fn halt_node(&mut self, id: NodeId) {
        if !self.slots[id.0].started {
            return;
        }
        let asset = self.asset.clone();
        let def = asset.def(id);
        for child in def.children() {
            self.halt_node(*child);
        }
        tracing::debug!(node = def.name(), "halt");
        self.exit(id, def);
        self.slots[id.0].state = NodeState::Invalid;
    }

    fn update_action(&mut self, id: NodeId, def: &NodeDef) -> NodeStatus {
        if let Runtime::Action {
            entry_failed: true, ..
        } = self.slots[id.0].runtime
        {
            return NodeStatus::Failure;
        }
        match self.with_action(id, def.name(), |a, ctx| a.on_update(ctx)) {
            Some(Ok(status)) => status,
            Some(Err(e)) => {
                tracing::warn!(node = def.name(), error = %e, "update failed");
                NodeStatus::Failure
            }
            None => NodeStatus::Failure,
        }
    }

    /// Sequence and selector: tick children from the active one onward,
    /// moving on while they return `advance_on`.
    fn tick_ordered(
        &mut self,
        id: NodeId,
        children: &[NodeId],
        advance_on: NodeStatus,
        exhausted: NodeStatus,
    ) -> NodeStatus {
        let mut index = self.slots[id.0].cursor;
        while index < children.len() {
            let child = children[index];
            if self.slots[child.0].mute {
                index += 1;
                continue;
            }
            let status = self.tick_node(child);
            if status == advance_on {
                index += 1;
                continue;
            }
            self.slots[id.0].cursor = if status == NodeStatus::Running {
                index
            } else {
                0
            };
            return status;
        }
        self.slots[id.0].cursor = 0;
        exhausted
    }

    /// Tick the children that have not finished yet, a child that finished
    /// keeps its result until the parallel itself exits.
    fn tick_parallel(
        &mut self,
        id: NodeId,
        children: &[NodeId],
        policy: &ParallelPolicy,
    ) -> NodeStatus {
        let active: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|c| !self.slots[c.0].mute)
            .collect();
        if active.is_empty() {
            return NodeStatus::Success;
        }
        let (need_success, need_failure) = policy.limits(active.len());

        let mut successes = 0;
        let mut failures = 0;
        for child in active.iter() {
            let recorded = self.slots[id.0]
                .finished
                .iter()
                .find(|(c, _)| c == child)
                .map(|(_, s)| *s);
            let status = match recorded {
                Some(status) => status,
                None => {
                    let status = self.tick_node(*child);
                    if status.is_terminal() {
                        self.slots[id.0].finished.push((*child, status));
                    }
                    status
                }
            };
            match status {
                NodeStatus::Success => successes += 1,
                NodeStatus::Failure => failures += 1,
                NodeStatus::Running => {}
            }
        }

        let status = if successes >= need_success {
            NodeStatus::Success
        } else if failures >= need_failure {
            NodeStatus::Failure
        } else {
            NodeStatus::Running
        };
        if status.is_terminal() {
            for child in active {
                self.halt_node(child);
            }
        }
        status
    }

    fn tick_decorator(&mut self, id: NodeId, def: &NodeDef, policy: &DecoratorPolicy) -> NodeStatus {
        let Some(child) = self.effective_child(def) else {
            tracing::trace!(node = def.name(), "decorator without child");
            return NodeStatus::Failure;
        };
        let now = self.env.clock.now();
        match policy {
            DecoratorPolicy::Invert => self.tick_node(child).invert(),
            DecoratorPolicy::ForceSuccess => match self.tick_node(child) {
                NodeStatus::Running => NodeStatus::Running,
                _ => NodeStatus::Success,
            },
            DecoratorPolicy::ForceFailure => match self.tick_node(child) {
                NodeStatus::Running => NodeStatus::Running,
                _ => NodeStatus::Failure,
            },
            DecoratorPolicy::Repeat { count } => match self.tick_node(child) {
                NodeStatus::Success => {
                    let slot = &mut self.slots[id.0];
                    slot.counter += 1;
                    if *count != 0 && slot.counter >= *count {
                        NodeStatus::Success
                    } else {
                        NodeStatus::Running
                    }
                }
                other => other,
            },
            DecoratorPolicy::Retry { attempts } => match self.tick_node(child) {
                NodeStatus::Failure => {
                    let slot = &mut self.slots[id.0];
                    slot.counter += 1;
                    if slot.counter > *attempts {
                        NodeStatus::Failure
                    } else {
                        tracing::debug!(node = def.name(), attempt = slot.counter, "retry");
                        NodeStatus::Running
                    }
                }
                other => other,
            },
            DecoratorPolicy::Cooldown { duration } => {
                if let Some(done) = self.slots[id.0].last_completed {
                    if now - done < *duration {
                        tracing::debug!(node = def.name(), remaining = duration - (now - done), "cooling down");
                        return NodeStatus::Failure;
                    }
                }
                let status = self.tick_node(child);
                if status.is_terminal() {
                    self.slots[id.0].last_completed = Some(now);
                }
                status
            }
            DecoratorPolicy::TimeLimit { duration } => {
                if now - self.slots[id.0].entered_at >= *duration {
                    tracing::debug!(node = def.name(), "time limit reached");
                    self.halt_node(child);
                    return NodeStatus::Failure;
                }
                self.tick_node(child)
            }
            DecoratorPolicy::Conditional { .. } => {
                if self.condition(id, def) {
                    self.tick_node(child)
                } else {
                    self.halt_node(child);
                    NodeStatus::Failure
                }
            }
        }
    }

    fn condition(&mut self, id: NodeId, def: &NodeDef) -> bool {
        let TreeInstance {
            slots, locals, env, ..
        } = self;
        let Runtime::Condition(Some(var)) = &slots[id.0].runtime else {
            return false;
        };
        let blackboard = Blackboard::new(locals, &env.globals);
        match blackboard.get(var) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(node = def.name(), error = %e, "condition unreadable");
                false
            }
        }
    }
}

impl Drop for TreeInstance {
    fn drop(&mut self) {
        self.halt();
    }
}
