//! Gameplay entities
//!
//! The player controller, enemy state machines and the short-lived
//! projectile/pickup entities. Each entity owns its own FSM state;
//! global progress state lives in the coordinator.

pub mod enemy;
pub mod pickup;
pub mod player;
pub mod projectile;

slotmap::new_key_type! {
    /// Stable key for an enemy in the world arena
    pub struct EnemyKey;

    /// Stable key for a projectile in the world arena
    pub struct ProjectileKey;

    /// Stable key for a pickup in the world arena
    pub struct PickupKey;
}
