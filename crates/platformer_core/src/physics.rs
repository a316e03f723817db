//! Physics collaborator interface
//!
//! The rigid-body and collision-detection engine is external: this
//! module defines the tag/layer vocabulary shared with it, the inbound
//! contact events the core reacts to, and a minimal kinematic mirror
//! of each entity's body so headless runs and tests can integrate
//! motion without the real engine.

use crate::entities::{EnemyKey, PickupKey, ProjectileKey};
use crate::foundation::math::Vec2;
use bitflags::bitflags;

bitflags! {
    /// Collision layer tags shared with the physics collaborator
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Tag: u32 {
        /// Player character
        const PLAYER = 1 << 0;
        /// Player melee hitbox trigger
        const PLAYER_HITBOX = 1 << 1;
        /// Enemy character
        const ENEMY = 1 << 2;
        /// Projectile in flight
        const PROJECTILE = 1 << 3;
        /// Collectible pickup trigger
        const PICKUP = 1 << 4;
        /// Patrol-reversal barrier trigger
        const BARRIER = 1 << 5;
        /// Instant-death zone
        const DEATH_ZONE = 1 << 6;
        /// Water (drowning) zone
        const WATER = 1 << 7;
    }
}

impl Tag {
    /// Check if two entities should collide based on layers and masks
    ///
    /// A's layer must be in B's mask and B's layer must be in A's mask.
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

/// Kind of rigid body the physics collaborator simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Fully simulated: gravity and velocity apply
    Dynamic,
    /// Moved only by the gameplay core (frozen during respawn limbo)
    Kinematic,
    /// Never moves (impacted projectiles)
    Static,
}

/// Kinematic mirror of an entity's rigid body
///
/// The physics collaborator owns the authoritative state; the core
/// reads and writes this mirror, and `integrate` provides a simple
/// stand-in so the simulation also runs headless.
#[derive(Debug, Clone)]
pub struct Body {
    /// World position
    pub position: Vec2,
    /// Linear velocity
    pub velocity: Vec2,
    /// Simulation kind
    pub kind: BodyKind,
    /// Gravity multiplier (0 for floating entities)
    pub gravity_scale: f32,
    /// Whether the collider reports contacts
    pub collider_enabled: bool,
    /// Whether the presentation layer should draw this entity
    pub visible: bool,
    /// Ground sensor output, updated by the physics collaborator
    pub grounded: bool,
}

impl Body {
    /// Create a dynamic body at a position
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            kind: BodyKind::Dynamic,
            gravity_scale: 1.0,
            collider_enabled: true,
            visible: true,
            grounded: false,
        }
    }

    /// Create a floating dynamic body unaffected by gravity
    pub fn new_floating(position: Vec2) -> Self {
        Self {
            gravity_scale: 0.0,
            ..Self::new(position)
        }
    }

    /// Advance the mirror by one timestep
    ///
    /// Only dynamic bodies move. A grounded body does not accumulate
    /// downward velocity.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        if self.kind != BodyKind::Dynamic {
            return;
        }
        self.velocity.y -= gravity * self.gravity_scale * dt;
        if self.grounded && self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
        self.position += self.velocity * dt;
    }

    /// Zero all motion
    pub fn stop(&mut self) {
        self.velocity = Vec2::zeros();
    }
}

/// One side of a reported contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBody {
    /// The player character
    Player,
    /// The player's melee hitbox trigger
    PlayerHitbox,
    /// An enemy entity
    Enemy(EnemyKey),
    /// A projectile entity
    Projectile(ProjectileKey),
    /// A pickup entity
    Pickup(PickupKey),
    /// A static tagged zone (barrier, death, water)
    Zone(Tag),
}

/// Overlap/collision event reported by the physics collaborator
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// First body involved
    pub a: ContactBody,
    /// Second body involved
    pub b: ContactBody,
}

impl Contact {
    /// Create a contact between two bodies
    pub fn new(a: ContactBody, b: ContactBody) -> Self {
        Self { a, b }
    }
}
