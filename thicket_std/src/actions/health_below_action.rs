use crate::capability::HealthRef;
use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthBelowActionConfig {
    /// Fraction of the maximum health, between 0 and 1.
    pub threshold: f32,
}
impl IsActionConfig for HealthBelowActionConfig {}

impl Default for HealthBelowActionConfig {
    fn default() -> Self {
        HealthBelowActionConfig { threshold: 0.3 }
    }
}

/// Success when the owner's health fraction is below the threshold.
#[derive(Debug, Default, Clone)]
pub struct HealthBelowAction {
    health: Option<HealthRef>,
    pub config: HealthBelowActionConfig,
}

impl HealthBelowAction {
    pub fn new(threshold: f32) -> Self {
        HealthBelowAction {
            health: None,
            config: HealthBelowActionConfig { threshold },
        }
    }
}

impl Action for HealthBelowAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.health = Some(ctx.capability::<HealthRef>()?);
        Ok(())
    }

    fn on_update(&mut self, _ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        match &self.health {
            Some(health) if health.fraction() < self.config.threshold => Ok(NodeStatus::Success),
            _ => Ok(NodeStatus::Failure),
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "health_below".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}
