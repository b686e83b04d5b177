//! A tiny simulated agent that provides every capability, for the demo and
//! for tests.

use crate::capability::{Health, HealthRef, Mover, MoverRef, Perception, PerceptionRef, Weapon, WeaponRef};
use parking_lot::Mutex;
use std::sync::Arc;
use thicket_core::owner::Agent;
use thicket_core::variable::{EntityId, GameObjectRef, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct SimTarget {
    pub id: EntityId,
    pub position: Vec3,
    pub visible: bool,
}

#[derive(Debug)]
struct SimState {
    position: Vec3,
    destination: Option<(Vec3, f32)>,
    health: f32,
    max_health: f32,
    ammo: u32,
    magazine: u32,
    shots: Vec<GameObjectRef>,
    targets: Vec<SimTarget>,
}

/// Agent living on a plane, moves in straight lines.
#[derive(Debug)]
pub struct SimAgent {
    state: Mutex<SimState>,
}

impl SimAgent {
    pub fn new(position: Vec3) -> Self {
        SimAgent {
            state: Mutex::new(SimState {
                position,
                destination: None,
                health: 100.0,
                max_health: 100.0,
                ammo: 6,
                magazine: 6,
                shots: vec![],
                targets: vec![],
            }),
        }
    }

    /// Register every capability of `sim` on a new [`Agent`].
    pub fn agent(name: &str, sim: &Arc<SimAgent>) -> Agent {
        let mover: MoverRef = sim.clone();
        let weapon: WeaponRef = sim.clone();
        let perception: PerceptionRef = sim.clone();
        let health: HealthRef = sim.clone();
        Agent::new(name)
            .with(mover)
            .with(weapon)
            .with(perception)
            .with(health)
    }

    pub fn set_health(&self, health: f32) {
        let mut state = self.state.lock();
        state.health = health.clamp(0.0, state.max_health);
    }

    pub fn set_ammo(&self, ammo: u32) {
        self.state.lock().ammo = ammo;
    }

    pub fn add_target(&self, target: SimTarget) {
        self.state.lock().targets.push(target);
    }

    pub fn set_visible(&self, id: EntityId, visible: bool) {
        for t in self.state.lock().targets.iter_mut().filter(|t| t.id == id) {
            t.visible = visible;
        }
    }

    /// Everything fired at so far.
    pub fn shots(&self) -> Vec<GameObjectRef> {
        self.state.lock().shots.clone()
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.state.lock().destination.map(|(d, _)| d)
    }

    /// Advance the movement by `dt` seconds.
    pub fn step(&self, dt: f32) {
        let mut state = self.state.lock();
        if let Some((destination, speed)) = state.destination {
            let offset = destination - state.position;
            let distance = offset.length();
            let travel = speed * dt;
            if distance <= travel {
                state.position = destination;
                state.destination = None;
            } else {
                state.position = state.position + offset.normalized() * travel;
            }
        }
    }
}

impl Mover for SimAgent {
    fn position(&self) -> Vec3 {
        self.state.lock().position
    }

    fn set_destination(&self, destination: Vec3, speed: f32) {
        self.state.lock().destination = Some((destination, speed));
    }

    fn stop(&self) {
        self.state.lock().destination = None;
    }

    fn is_moving(&self) -> bool {
        self.state.lock().destination.is_some()
    }
}

impl Weapon for SimAgent {
    fn ammo(&self) -> u32 {
        self.state.lock().ammo
    }

    fn fire(&self, target: GameObjectRef) -> bool {
        let mut state = self.state.lock();
        if state.ammo == 0 || target.0.is_none() {
            return false;
        }
        state.ammo -= 1;
        state.shots.push(target);
        true
    }

    fn reload(&self) {
        let mut state = self.state.lock();
        state.ammo = state.magazine;
    }
}

impl Perception for SimAgent {
    fn nearest_target(&self, range: f32) -> Option<(GameObjectRef, Vec3)> {
        let state = self.state.lock();
        state
            .targets
            .iter()
            .filter(|t| t.visible)
            .map(|t| (t, t.position.distance(&state.position)))
            .filter(|(_, d)| *d <= range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(t, _)| (GameObjectRef(Some(t.id)), t.position))
    }

    fn can_see(&self, target: GameObjectRef) -> bool {
        let Some(id) = target.0 else {
            return false;
        };
        self.state
            .lock()
            .targets
            .iter()
            .any(|t| t.id == id && t.visible)
    }
}

impl Health for SimAgent {
    fn health(&self) -> f32 {
        self.state.lock().health
    }

    fn max_health(&self) -> f32 {
        self.state.lock().max_health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_and_arrives() {
        let sim = SimAgent::new(Vec3::ZERO);
        sim.set_destination(Vec3::new(3.0, 0.0, 4.0), 2.5);
        sim.step(1.0);
        assert!((sim.position().distance(&Vec3::ZERO) - 2.5).abs() < 1e-4);
        assert!(sim.is_moving());
        sim.step(2.0);
        assert_eq!(sim.position(), Vec3::new(3.0, 0.0, 4.0));
        assert!(!sim.is_moving());
    }

    #[test]
    fn perception_picks_nearest_visible() {
        let sim = SimAgent::new(Vec3::ZERO);
        sim.add_target(SimTarget {
            id: EntityId(1),
            position: Vec3::new(5.0, 0.0, 0.0),
            visible: true,
        });
        sim.add_target(SimTarget {
            id: EntityId(2),
            position: Vec3::new(2.0, 0.0, 0.0),
            visible: false,
        });
        let found = sim.nearest_target(10.0).map(|(t, _)| t);
        assert_eq!(found, Some(GameObjectRef(Some(EntityId(1)))));
        sim.set_visible(EntityId(2), true);
        let found = sim.nearest_target(10.0).map(|(t, _)| t);
        assert_eq!(found, Some(GameObjectRef(Some(EntityId(2)))));
        assert!(sim.nearest_target(1.0).is_none());
        assert!(!sim.can_see(GameObjectRef(None)));
    }
}
