use crate::as_any::{AsAny, AsAnyHelper};
use crate::clock::Clock;
use crate::error::{ActionError, VariableError};
use crate::owner::{Capabilities, Owner};
use crate::store::{AnyVar, Blackboard, Var};
use crate::variable::{Value, VariableValue};
use crate::{NodeId, NodeStatus};
use serde::{Deserialize, Serialize};

/// Name under which an action type is registered and serialized.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionType(pub String);

impl From<&str> for ActionType {
    fn from(v: &str) -> Self {
        ActionType(v.to_owned())
    }
}

impl From<ActionType> for String {
    fn from(v: ActionType) -> Self {
        v.0
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration of an action, type erased.
pub trait ActionConfig: std::fmt::Debug + AsAny + Send {
    fn clone_boxed(&self) -> Box<dyn ActionConfig>;
}

impl Clone for Box<dyn ActionConfig> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// Marker for plain config structs, gives them [`ActionConfig`] and a loader.
pub trait IsActionConfig: Clone + std::fmt::Debug + Send + 'static {
    /// Overwrite self with `config` if it is of the same type.
    fn load_action_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        let v = (*config).downcast_ref::<Self>().ok_or_else(|| {
            ActionError::Config(format!(
                "expected {}, got {}",
                std::any::type_name::<Self>(),
                config.type_name()
            ))
        })?;
        *self = v.clone();
        Ok(())
    }
}

impl<T: IsActionConfig> ActionConfig for T {
    fn clone_boxed(&self) -> Box<dyn ActionConfig> {
        Box::new(self.clone())
    }
}

/// Cloning of boxed actions, implemented for every `Clone` action.
pub trait ActionClone {
    fn clone_boxed(&self) -> Box<dyn Action>;
}

impl<T: Action + Clone + 'static> ActionClone for T {
    fn clone_boxed(&self) -> Box<dyn Action> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Action> {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// Trait that leaf nodes implement.
///
/// The asset holds a prototype of every action, each instance works on its
/// own clone. Hooks are called in this order:
///
/// - `on_initialize` once, when the instance is created. Bind variables and
///   look up capabilities here. An error disables the node, it then reports
///   [`NodeStatus::Failure`] until the instance is dropped.
/// - `on_entry` when the node is ticked while not started.
/// - `on_update` on every tick, the status decides what happens next.
/// - `on_exit` when the node stops running, because it returned a terminal
///   status or because it was interrupted.
///
/// An `Err` from `on_entry` or `on_update` is logged and counts as
/// [`NodeStatus::Failure`].
pub trait Action: std::fmt::Debug + AsAny + ActionClone {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let _ = ctx;
        Ok(())
    }

    fn on_entry(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        let _ = ctx;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError>;

    fn on_exit(&mut self, ctx: &mut ActionContext) {
        let _ = ctx;
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        None
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        Err(ActionError::Config(format!(
            "{} takes no config, got {}",
            self.action_type(),
            config.type_name()
        )))
    }

    fn static_type() -> ActionType
    where
        Self: Sized;

    fn action_type(&self) -> ActionType;
}

/// What an action sees while one of its hooks runs.
pub struct ActionContext<'a> {
    node: NodeId,
    name: &'a str,
    owner: &'a dyn Owner,
    clock: &'a dyn Clock,
    blackboard: Blackboard<'a>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        node: NodeId,
        name: &'a str,
        owner: &'a dyn Owner,
        clock: &'a dyn Clock,
        blackboard: Blackboard<'a>,
    ) -> Self {
        ActionContext {
            node,
            name,
            owner,
            clock,
            blackboard,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Name of the node in the asset.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn owner(&self) -> &dyn Owner {
        self.owner
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Fetch a capability from the owner or fail with [`ActionError::MissingCapability`].
    pub fn capability<C: std::any::Any + Clone>(&self) -> Result<C, ActionError> {
        self.owner
            .capability::<C>()
            .ok_or_else(|| ActionError::MissingCapability {
                owner: self.owner.name().to_owned(),
                capability: std::any::type_name::<C>(),
            })
    }

    pub fn bind<T: VariableValue>(&self, name: &str) -> Result<Var<T>, VariableError> {
        self.blackboard.bind(name)
    }

    pub fn bind_any(&self, name: &str) -> Result<AnyVar, VariableError> {
        self.blackboard.bind_any(name)
    }

    pub fn get<T: VariableValue>(&self, var: &Var<T>) -> Result<T, VariableError> {
        self.blackboard.get(var)
    }

    pub fn set<T: VariableValue>(&mut self, var: &Var<T>, value: T) -> Result<(), VariableError> {
        self.blackboard.set(var, value)
    }

    pub fn get_any(&self, var: &AnyVar) -> Result<Value, VariableError> {
        self.blackboard.get_any(var)
    }

    pub fn set_any(&mut self, var: &AnyVar, value: Value) -> Result<(), VariableError> {
        self.blackboard.set_any(var, value)
    }

    pub fn blackboard(&self) -> &Blackboard<'a> {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard<'a> {
        &mut self.blackboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct PingConfig {
        count: u32,
    }
    impl IsActionConfig for PingConfig {}

    #[derive(Clone, Debug)]
    struct Pong;
    impl IsActionConfig for Pong {}

    #[test]
    fn config_loading() -> Result<(), ActionError> {
        let mut config = PingConfig { count: 1 };
        let other: Box<dyn ActionConfig> = Box::new(PingConfig { count: 5 });
        config.load_action_config(&*other.clone())?;
        assert_eq!(config, PingConfig { count: 5 });

        let wrong: Box<dyn ActionConfig> = Box::new(Pong);
        assert!(matches!(
            config.load_action_config(&*wrong),
            Err(ActionError::Config(_))
        ));
        Ok(())
    }
}
