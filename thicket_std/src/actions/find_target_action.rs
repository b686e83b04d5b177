use crate::capability::PerceptionRef;
use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;
use thicket_core::variable::{GameObjectRef, Vec3};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FindTargetActionConfig {
    pub range: f32,
    /// GameObject variable that receives the target.
    pub target: String,
    /// Optional Vector3 variable that receives the target position, empty to skip.
    #[serde(default)]
    pub target_position: String,
}
impl IsActionConfig for FindTargetActionConfig {}

impl Default for FindTargetActionConfig {
    fn default() -> Self {
        FindTargetActionConfig {
            range: 20.0,
            target: "target".to_owned(),
            target_position: String::new(),
        }
    }
}

/// Looks for the nearest visible target within range.
///
/// Success stores it, Failure clears the target variable.
///
/// Needs a [`PerceptionRef`] capability.
#[derive(Debug, Default, Clone)]
pub struct FindTargetAction {
    perception: Option<PerceptionRef>,
    target: Var<GameObjectRef>,
    target_position: Option<Var<Vec3>>,
    pub config: FindTargetActionConfig,
}

impl FindTargetAction {
    pub fn new(range: f32, target: &str, target_position: &str) -> Self {
        FindTargetAction {
            config: FindTargetActionConfig {
                range,
                target: target.to_owned(),
                target_position: target_position.to_owned(),
            },
            ..Default::default()
        }
    }
}

impl Action for FindTargetAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.perception = Some(ctx.capability::<PerceptionRef>()?);
        self.target = ctx.bind(&self.config.target)?;
        self.target_position = if self.config.target_position.is_empty() {
            None
        } else {
            Some(ctx.bind(&self.config.target_position)?)
        };
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let perception = self
            .perception
            .as_ref()
            .ok_or_else(|| ActionError::Failed("find_target was not initialized".to_owned()))?;
        match perception.nearest_target(self.config.range) {
            Some((target, position)) => {
                ctx.set(&self.target, target)?;
                if let Some(var) = &self.target_position {
                    ctx.set(var, position)?;
                }
                Ok(NodeStatus::Success)
            }
            None => {
                ctx.set(&self.target, GameObjectRef(None))?;
                Ok(NodeStatus::Failure)
            }
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "find_target".into()
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
    use thicket_core::variable::EntityId;

    #[test]
    fn stores_nearest_target() -> Result<(), Box<dyn std::error::Error>> {
        let action = FindTargetAction::new(10.0, "enemy", "enemy_at");
        let mut h = Harness::new(action, |b| {
            b.declare_as("enemy", GameObjectRef(None))?;
            b.declare_as("enemy_at", Vec3::ZERO)
        })?;
        assert_eq!(h.tick(), NodeStatus::Failure);

        let at = Vec3::new(0.0, 0.0, 8.0);
        h.sim.add_target(SimTarget {
            id: EntityId(3),
            position: at,
            visible: true,
        });
        assert_eq!(h.tick(), NodeStatus::Success);
        assert_eq!(h.local::<GameObjectRef>("enemy")?, GameObjectRef(Some(EntityId(3))));
        assert_eq!(h.local::<Vec3>("enemy_at")?, at);

        h.sim.set_visible(EntityId(3), false);
        assert_eq!(h.tick(), NodeStatus::Failure);
        assert_eq!(h.local::<GameObjectRef>("enemy")?, GameObjectRef(None));
        Ok(())
    }
}
