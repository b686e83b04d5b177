use crate::capability::PerceptionRef;
use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;
use thicket_core::variable::GameObjectRef;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanSeeActionConfig {
    pub target: String,
}
impl IsActionConfig for CanSeeActionConfig {}

impl Default for CanSeeActionConfig {
    fn default() -> Self {
        CanSeeActionConfig {
            target: "target".to_owned(),
        }
    }
}

/// Success while the target in the variable is visible to the owner.
#[derive(Debug, Default, Clone)]
pub struct CanSeeAction {
    perception: Option<PerceptionRef>,
    target: Var<GameObjectRef>,
    pub config: CanSeeActionConfig,
}

impl CanSeeAction {
    pub fn new(target: &str) -> Self {
        CanSeeAction {
            config: CanSeeActionConfig {
                target: target.to_owned(),
            },
            ..Default::default()
        }
    }
}

impl Action for CanSeeAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.perception = Some(ctx.capability::<PerceptionRef>()?);
        self.target = ctx.bind(&self.config.target)?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let target = ctx.get(&self.target)?;
        let visible = self
            .perception
            .as_ref()
            .is_some_and(|p| p.can_see(target));
        if visible {
            Ok(NodeStatus::Success)
        } else {
            Ok(NodeStatus::Failure)
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "can_see".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimTarget;
    use crate::testing::Harness;
    use thicket_core::variable::{EntityId, Vec3};

    #[test]
    fn follows_visibility() -> Result<(), Box<dyn std::error::Error>> {
        let enemy = GameObjectRef(Some(EntityId(9)));
        let mut h = Harness::new(CanSeeAction::new("enemy"), |b| b.declare_as("enemy", enemy))?;
        assert_eq!(h.tick(), NodeStatus::Failure);
        h.sim.add_target(SimTarget {
            id: EntityId(9),
            position: Vec3::new(1.0, 0.0, 0.0),
            visible: true,
        });
        assert_eq!(h.tick(), NodeStatus::Success);
        h.sim.set_visible(EntityId(9), false);
        assert_eq!(h.tick(), NodeStatus::Failure);
        Ok(())
    }
}
