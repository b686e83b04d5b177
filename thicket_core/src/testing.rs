//! Actions used by the unit tests of this crate.

use crate::node_prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Entry(String),
    Update(String),
    Exit(String),
}

#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    pub fn updates(&self, label: &str) -> usize {
        self.count(|e| matches!(e, Event::Update(l) if l == label))
    }

    pub fn exits(&self, label: &str) -> usize {
        self.count(|e| matches!(e, Event::Exit(l) if l == label))
    }

    pub fn entries(&self, label: &str) -> usize {
        self.count(|e| matches!(e, Event::Entry(l) if l == label))
    }

    fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.0.lock().iter().filter(|e| f(e)).count()
    }

    fn push(&self, event: Event) {
        self.0.lock().push(event);
    }
}

/// Returns the statuses of its script in order, the last one repeats.
#[derive(Clone, Debug)]
pub struct Scripted {
    label: String,
    script: Vec<NodeStatus>,
    step: usize,
    log: EventLog,
}

impl Scripted {
    pub fn new(label: &str, log: &EventLog, script: &[NodeStatus]) -> Self {
        Scripted {
            label: label.to_owned(),
            script: script.to_vec(),
            step: 0,
            log: log.clone(),
        }
    }

    pub fn always(status: NodeStatus) -> Self {
        Scripted::new("", &EventLog::default(), &[status])
    }
}

impl Action for Scripted {
    fn on_entry(&mut self, _ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.log.push(Event::Entry(self.label.clone()));
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        self.log.push(Event::Update(self.label.clone()));
        let index = self.step.min(self.script.len().saturating_sub(1));
        self.step += 1;
        Ok(self.script.get(index).copied().unwrap_or(NodeStatus::Failure))
    }

    fn on_exit(&mut self, _ctx: &mut ActionContext) {
        self.log.push(Event::Exit(self.label.clone()));
    }

    fn static_type() -> ActionType {
        "scripted".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

/// Adds one to an int variable every update and succeeds.
#[derive(Clone, Debug)]
pub struct Bump {
    name: String,
    var: Var<i32>,
}

impl Bump {
    pub fn new(name: &str) -> Self {
        Bump {
            name: name.to_owned(),
            var: Var::default(),
        }
    }
}

impl Action for Bump {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.var = ctx.bind(&self.name)?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let v = ctx.get(&self.var)?;
        ctx.set(&self.var, v + 1)?;
        Ok(NodeStatus::Success)
    }

    fn static_type() -> ActionType {
        "bump".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

/// Needs a `u32` capability on the owner, succeeds while it is non zero.
#[derive(Clone, Debug, Default)]
pub struct NeedsCount {
    count: u32,
}

impl Action for NeedsCount {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.count = ctx.capability::<u32>()?;
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        Ok(if self.count > 0 {
            NodeStatus::Success
        } else {
            NodeStatus::Failure
        })
    }

    fn static_type() -> ActionType {
        "needs_count".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
