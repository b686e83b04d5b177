use crate::capability::MoverRef;
use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;
use thicket_core::variable::Vec3;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveToActionConfig {
    /// Vector3 variable holding the destination.
    pub target: String,
    pub speed: f32,
    /// Arrived once this close to the destination.
    pub stopping_distance: f32,
}
impl IsActionConfig for MoveToActionConfig {}

impl Default for MoveToActionConfig {
    fn default() -> Self {
        MoveToActionConfig {
            target: "destination".to_owned(),
            speed: 3.5,
            stopping_distance: 0.5,
        }
    }
}

/// Moves the owner towards the position in `target`.
///
/// Running while on the way, Success on arrival, Failure if the mover
/// stopped before getting there. A destination that changes while moving is
/// followed. The movement is stopped on exit, so an interrupted move does not
/// keep the agent walking.
///
/// Needs a [`MoverRef`] capability.
#[derive(Debug, Default, Clone)]
pub struct MoveToAction {
    mover: Option<MoverRef>,
    target: Var<Vec3>,
    destination: Vec3,
    pub config: MoveToActionConfig,
}

impl MoveToAction {
    pub fn new(target: &str, speed: f32) -> Self {
        MoveToAction {
            config: MoveToActionConfig {
                target: target.to_owned(),
                speed,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn mover(&self) -> Result<&MoverRef, ActionError> {
        self.mover
            .as_ref()
            .ok_or_else(|| ActionError::Failed("move_to was not initialized".to_owned()))
    }
}

impl Action for MoveToAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.mover = Some(ctx.capability::<MoverRef>()?);
        self.target = ctx.bind(&self.config.target)?;
        Ok(())
    }

    fn on_entry(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.destination = ctx.get(&self.target)?;
        self.mover()?
            .set_destination(self.destination, self.config.speed);
        debug!(node = ctx.name(), destination = ?self.destination, "moving");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let destination = ctx.get(&self.target)?;
        let mover = self.mover()?.clone();
        if destination != self.destination {
            self.destination = destination;
            mover.set_destination(destination, self.config.speed);
        }
        if mover.position().distance(&destination) <= self.config.stopping_distance {
            Ok(NodeStatus::Success)
        } else if mover.is_moving() {
            Ok(NodeStatus::Running)
        } else {
            Ok(NodeStatus::Failure)
        }
    }

    fn on_exit(&mut self, _ctx: &mut ActionContext) {
        if let Some(mover) = &self.mover {
            mover.stop();
        }
    }

    fn get_config(&self) -> Option<Box<dyn ActionConfig>> {
        Some(Box::new(self.config.clone()))
    }

    fn set_config(&mut self, config: &dyn ActionConfig) -> Result<(), ActionError> {
        self.config.load_action_config(config)
    }

    fn static_type() -> ActionType {
        "move_to".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Mover;
    use crate::testing::Harness;
    use NodeStatus::{Running, Success};

    fn harness() -> Result<Harness, thicket_core::StructuralError> {
        Harness::new(MoveToAction::new("goal", 2.0), |b| {
            b.declare_as("goal", Vec3::new(4.0, 0.0, 0.0))
        })
    }

    #[test]
    fn walks_to_destination() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness()?;
        assert_eq!(h.tick(), Running);
        assert_eq!(h.sim.destination(), Some(Vec3::new(4.0, 0.0, 0.0)));
        h.sim.step(1.0);
        assert_eq!(h.tick(), Running);
        h.sim.step(1.0);
        assert_eq!(h.tick(), Success);
        assert_eq!(h.sim.position(), Vec3::new(4.0, 0.0, 0.0));
        Ok(())
    }

    #[test]
    fn follows_moved_destination() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness()?;
        assert_eq!(h.tick(), Running);
        h.instance
            .locals_mut()
            .set("goal", Vec3::new(0.0, 0.0, -6.0))?;
        assert_eq!(h.tick(), Running);
        assert_eq!(h.sim.destination(), Some(Vec3::new(0.0, 0.0, -6.0)));
        Ok(())
    }

    #[test]
    fn halt_stops_movement() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = harness()?;
        assert_eq!(h.tick(), Running);
        assert!(h.sim.is_moving());
        h.instance.halt();
        assert!(!h.sim.is_moving());
        Ok(())
    }

    #[test]
    fn missing_mover_disables() -> Result<(), Box<dyn std::error::Error>> {
        let mut b = thicket_core::prelude::TreeBuilder::new("no mover");
        let root = b.add_root("root");
        let walk = b.add_action("walk", MoveToAction::new("goal", 1.0));
        b.add_relation(root, walk)?;
        b.declare_as("goal", Vec3::ZERO)?;
        let mut instance = thicket_core::prelude::TreeInstance::new(
            std::sync::Arc::new(b.build()?),
            thicket_core::prelude::Environment::default(),
        )?;
        assert!(instance.is_disabled(walk));
        assert_eq!(instance.tick(), NodeStatus::Failure);
        Ok(())
    }
}
