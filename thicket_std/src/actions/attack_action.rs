use crate::capability::WeaponRef;
use serde::{Deserialize, Serialize};
use thicket_core::node_prelude::*;
use thicket_core::variable::GameObjectRef;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttackActionConfig {
    /// GameObject variable holding the target.
    pub target: String,
    /// Reload instead of failing when the magazine is empty.
    pub reload_when_empty: bool,
}
impl IsActionConfig for AttackActionConfig {}

impl Default for AttackActionConfig {
    fn default() -> Self {
        AttackActionConfig {
            target: "target".to_owned(),
            reload_when_empty: true,
        }
    }
}

/// Fires one shot at the target.
///
/// Failure without a target or when the weapon does not fire. With an empty
/// magazine it either reloads and reports Running for that tick, or fails.
///
/// Needs a [`WeaponRef`] capability.
#[derive(Debug, Default, Clone)]
pub struct AttackAction {
    weapon: Option<WeaponRef>,
    target: Var<GameObjectRef>,
    pub config: AttackActionConfig,
}

impl AttackAction {
    pub fn new(target: &str) -> Self {
        AttackAction {
            config: AttackActionConfig {
                target: target.to_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl Action for AttackAction {
    fn on_initialize(&mut self, ctx: &mut ActionContext) -> Result<(), ActionError> {
        self.weapon = Some(ctx.capability::<WeaponRef>()?);
        self.target = ctx.bind(&self.config.target)?;
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut ActionContext) -> Result<NodeStatus, ActionError> {
        let weapon = self
            .weapon
            .as_ref()
            .ok_or_else(|| ActionError::Failed("attack was not initialized".to_owned()))?;
        let target = ctx.get(&self.target)?;
        if target.0.is_none() {
            return Ok(NodeStatus::Failure);
        }
        if weapon.ammo() == 0 {
            if self.config.reload_when_empty {
                weapon.reload();
                return Ok(NodeStatus::Running);
            }
            return Ok(NodeStatus::Failure);
        }
        if weapon.fire(target) {
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
        "attack".into()
    }

    fn action_type(&self) -> ActionType {
        Self::static_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Weapon;
    use crate::testing::Harness;
    use thicket_core::variable::EntityId;
    use NodeStatus::{Failure, Running, Success};

    #[test]
    fn fires_and_reloads() -> Result<(), Box<dyn std::error::Error>> {
        let enemy = GameObjectRef(Some(EntityId(7)));
        let mut h = Harness::new(AttackAction::new("enemy"), |b| b.declare_as("enemy", enemy))?;
        h.sim.set_ammo(1);
        assert_eq!(h.tick(), Success);
        assert_eq!(h.sim.shots(), vec![enemy]);
        assert_eq!(h.tick(), Running);
        assert_eq!(h.sim.ammo(), 6);
        assert_eq!(h.tick(), Success);
        assert_eq!(h.sim.shots().len(), 2);
        Ok(())
    }

    #[test]
    fn no_target_fails() -> Result<(), Box<dyn std::error::Error>> {
        let mut h = Harness::new(AttackAction::new("enemy"), |b| {
            b.declare_as("enemy", GameObjectRef(None))
        })?;
        assert_eq!(h.tick(), Failure);
        assert!(h.sim.shots().is_empty());
        Ok(())
    }

    #[test]
    fn empty_without_reload_fails() -> Result<(), Box<dyn std::error::Error>> {
        let mut attack = AttackAction::new("enemy");
        attack.config.reload_when_empty = false;
        let enemy = GameObjectRef(Some(EntityId(1)));
        let mut h = Harness::new(attack, |b| b.declare_as("enemy", enemy))?;
        h.sim.set_ammo(0);
        assert_eq!(h.tick(), Failure);
        assert_eq!(h.sim.ammo(), 0);
        Ok(())
    }
}
