use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;
use tracing::info;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogActionConfig {
    pub message: String,
}
impl IsActionConfig for LogActionConfig {}

/// Writes its message to the log and succeeds.
#[derive(Debug, Default, Clone)]
pub struct LogAction {
    pub config: LogActionConfig,
}

impl LogAction {
    pub fn new(message: &str) -> Self {
        LogAction {
            config: LogActionConfig {
                message: message.to_owned(),
            },
        }
    }
}

impl Action for LogAction {
    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        info!(node = ctx.name(), "{}", self.config.message);
        Ok(NodeStatus::Success)
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "log".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
