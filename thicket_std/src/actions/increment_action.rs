use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncrementActionConfig {
    pub variable: String,
    pub amount: i32,
}
impl IsActionConfig for IncrementActionConfig {}

impl Default for IncrementActionConfig {
    fn default() -> Self {
        IncrementActionConfig {
            variable: String::new(),
            amount: 1,
        }
    }
}

/// Adds `amount` to an int variable, saturating, and succeeds.
#[derive(Debug, Default, Clone)]
pub struct IncrementAction {
    counter: Var<i32>,
    pub config: IncrementActionConfig,
}

impl IncrementAction {
    pub fn new(variable: &str, amount: i32) -> Self {
        IncrementAction {
            config: IncrementActionConfig {
                variable: variable.to_owned(),
                amount,
            },
            ..Default::default()
        }
    }
}

impl Action for IncrementAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.counter = ctx.bind(&self.config.variable)?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let v = ctx.get(&self.counter)?;
        ctx.set(&self.counter, v.saturating_add(self.config.amount))?;
        Ok(NodeStatus::Success)
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "increment".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
