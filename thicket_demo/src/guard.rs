//! The built-in tree: a guard that flees when hurt, shoots what it sees and
//! patrols otherwise.

use std::sync::Arc;
use thicket_core::prelude::*;
use thicket_core::variable::{GameObjectRef, Value, Vec3};
use thicket_core::StructuralError;
use thicket_std::actions::*;

pub const HOME: Vec3 = Vec3 {
    x: -5.0,
    y: 0.0,
    z: 0.0,
};

fn patrol() -> Result<TreeAsset, StructuralError> {
    let mut b = TreeBuilder::new("patrol");
    b.declare_as("waypoint", Vec3::ZERO)?;
    let root = b.add_root("patrol");
    let route = b.add_node("route", NodeKind::Sequence);
    b.add_relation(root, route)?;

    let mut legs = vec![];
    for (i, point) in [Vec3::new(8.0, 0.0, 0.0), Vec3::new(8.0, 0.0, 8.0)]
        .into_iter()
        .enumerate()
    {
        legs.push(b.add_action(
            &format!("pick waypoint {i}"),
            SetVariableAction::new("waypoint", Value::Vector3(point)),
        ));
        legs.push(b.add_action(&format!("walk {i}"), MoveToAction::new("waypoint", 2.0)));
        legs.push(b.add_action(&format!("look around {i}"), WaitAction::new(1.0)));
    }
    b.set_children(route, &legs)?;
    b.build()
}

/// Watch the surroundings every tick while acting on what was seen.
///
/// Both branches repeat forever. The watch branch keeps `calm` up to date,
/// the patrol only runs while it is set so a sighting interrupts it.
pub fn guard() -> Result<TreeAsset, StructuralError> {
    let mut b = TreeBuilder::new("guard");
    b.declare_as("home", HOME)?;
    b.declare_as("enemy", GameObjectRef(None))?;
    b.declare_as("enemy_at", Vec3::ZERO)?;
    b.declare_as("calm", true)?;
    b.declare_as("shots_fired", 0i32)?;

    let root = b.add_root("guard");
    let forever = ParallelPolicy::new(Threshold::All, Some(Threshold::All));
    let both = b.add_node("watch and act", NodeKind::Parallel(forever));
    b.add_relation(root, both)?;

    let watch = b.add_node(
        "watch",
        NodeKind::Decorator(DecoratorPolicy::Repeat { count: 0 }),
    );
    let scan = b.add_node("scan", NodeKind::Selector);
    let sighting = b.add_node("sighting", NodeKind::Sequence);
    let spot = b.add_action("spot", FindTargetAction::new(12.0, "enemy", "enemy_at"));
    let alarm = b.add_action("alarm", SetVariableAction::new("calm", Value::Bool(false)));
    b.set_children(sighting, &[spot, alarm])?;
    let wounded = b.add_node("wounded", NodeKind::Sequence);
    let low = b.add_action("low health", HealthBelowAction::new(0.3));
    let worry = b.add_action("worry", SetVariableAction::new("calm", Value::Bool(false)));
    b.set_children(wounded, &[low, worry])?;
    let relax = b.add_action("relax", SetVariableAction::new("calm", Value::Bool(true)));
    b.set_children(scan, &[sighting, wounded, relax])?;
    b.add_relation(watch, scan)?;

    let act = b.add_node("act", NodeKind::Selector);

    let flee = b.add_node("flee", NodeKind::Sequence);
    let hurt = b.add_action("hurt", HealthBelowAction::new(0.3));
    let run_home = b.add_action("run home", MoveToAction::new("home", 4.0));
    b.set_children(flee, &[hurt, run_home])?;

    let engage = b.add_node("engage", NodeKind::Sequence);
    let visible = b.add_action("visible", CanSeeAction::new("enemy"));
    let announce = b.add_action("announce", LogAction::new("engaging"));
    let cooldown = b.add_node(
        "trigger discipline",
        NodeKind::Decorator(DecoratorPolicy::Cooldown { duration: 0.5 }),
    );
    let shoot = b.add_node("shoot", NodeKind::Sequence);
    let fire = b.add_action("fire", AttackAction::new("enemy"));
    let count = b.add_action("count", IncrementAction::new("shots_fired", 1));
    b.set_children(shoot, &[fire, count])?;
    b.add_relation(cooldown, shoot)?;
    b.set_children(engage, &[visible, announce, cooldown])?;

    let while_calm = b.add_node(
        "while calm",
        NodeKind::Decorator(DecoratorPolicy::Conditional {
            variable: "calm".to_owned(),
        }),
    );
    let patrol = b.add_node("patrol", NodeKind::Subtree(Arc::new(patrol()?)));
    b.add_relation(while_calm, patrol)?;

    b.set_children(act, &[flee, engage, while_calm])?;

    let keep_acting = b.add_node(
        "keep acting",
        NodeKind::Decorator(DecoratorPolicy::Repeat { count: 0 }),
    );
    let settle = b.add_node("settle", NodeKind::Decorator(DecoratorPolicy::ForceSuccess));
    b.add_relation(keep_acting, settle)?;
    b.add_relation(settle, act)?;
    b.set_children(both, &[watch, keep_acting])?;
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_std::capability::{Mover, Weapon};
    use thicket_std::sim::{SimAgent, SimTarget};
    use thicket_core::variable::EntityId;

    fn run(sim: &Arc<SimAgent>) -> Result<(TreeInstance, Arc<ManualClock>), StructuralError> {
        let clock = Arc::new(ManualClock::new(0.0));
        let env = Environment::new(
            Arc::new(SimAgent::agent("guard", sim)),
            GlobalStore::default(),
            clock.clone(),
        );
        Ok((TreeInstance::new(Arc::new(guard()?), env)?, clock))
    }

    #[test]
    fn patrols_when_alone() -> Result<(), StructuralError> {
        let sim = Arc::new(SimAgent::new(Vec3::ZERO));
        let (mut instance, _clock) = run(&sim)?;
        assert_eq!(instance.tick(), NodeStatus::Running);
        assert_eq!(sim.destination(), Some(Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(instance.locals().try_get::<bool>("calm"), Ok(true));
        Ok(())
    }

    #[test]
    fn shoots_visible_enemy() -> Result<(), Box<dyn std::error::Error>> {
        let sim = Arc::new(SimAgent::new(Vec3::ZERO));
        let (mut instance, clock) = run(&sim)?;
        instance.tick();
        assert!(sim.is_moving());

        sim.add_target(SimTarget {
            id: EntityId(4),
            position: Vec3::new(0.0, 0.0, 5.0),
            visible: true,
        });
        // The sighting interrupts the patrol, which stops walking.
        clock.set(0.25);
        assert_eq!(instance.tick(), NodeStatus::Running);
        assert!(!sim.is_moving());
        assert!(!instance.locals().try_get::<bool>("calm")?);

        clock.set(0.5);
        instance.tick();
        assert_eq!(sim.ammo(), 5);

        // Cooldown holds the next shot back.
        clock.set(0.75);
        instance.tick();
        assert_eq!(sim.ammo(), 5);
        clock.set(1.0);
        instance.tick();
        assert_eq!(sim.ammo(), 4);
        assert_eq!(instance.locals().try_get::<i32>("shots_fired")?, 2);
        Ok(())
    }

    #[test]
    fn flees_when_hurt() -> Result<(), StructuralError> {
        let sim = Arc::new(SimAgent::new(Vec3::ZERO));
        sim.set_health(10.0);
        let (mut instance, _clock) = run(&sim)?;
        assert_eq!(instance.tick(), NodeStatus::Running);
        assert_eq!(sim.destination(), Some(HOME));
        Ok(())
    }
}
