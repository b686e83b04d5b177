//! Services the host offers to the actions in this crate.
//!
//! Actions look these up on the owner as `Arc<dyn Trait>`. The methods take
//! `&self`, implementations keep their own interior state.

use std::sync::Arc;
use thicket_core::variable::{GameObjectRef, Vec3};

pub trait Mover: std::fmt::Debug + Send + Sync {
    fn position(&self) -> Vec3;

    /// Start moving towards `destination`, replacing any earlier one.
    fn set_destination(&self, destination: Vec3, speed: f32);

    fn stop(&self);

    fn is_moving(&self) -> bool;
}

pub trait Weapon: std::fmt::Debug + Send + Sync {
    fn ammo(&self) -> u32;

    /// Fire at the target, false if nothing was fired.
    fn fire(&self, target: GameObjectRef) -> bool;

    fn reload(&self);
}

pub trait Perception: std::fmt::Debug + Send + Sync {
    /// The closest visible target within `range` and its position.
    fn nearest_target(&self, range: f32) -> Option<(GameObjectRef, Vec3)>;

    fn can_see(&self, target: GameObjectRef) -> bool;
}

pub trait Health: std::fmt::Debug + Send + Sync {
    fn health(&self) -> f32;

    fn max_health(&self) -> f32;

    fn fraction(&self) -> f32 {
        if self.max_health() > 0.0 {
            self.health() / self.max_health()
        } else {
            0.0
        }
    }
}

pub type MoverRef = Arc<dyn Mover>;
pub type WeaponRef = Arc<dyn Weapon>;
pub type PerceptionRef = Arc<dyn Perception>;
pub type HealthRef = Arc<dyn Health>;
