//! Collectible pickups
//!
//! A pickup applies its effect exactly once. Collection marks the
//! pickup consumed and disables its collider immediately; the body
//! stays briefly in the world while the collection effect plays, then
//! a despawn timer removes it.

use crate::config::PickupConfig;
use crate::entities::PickupKey;
use crate::events::{AnimSignal, AnimTarget, EventBus, GameEvent};
use crate::foundation::math::Vec2;
use crate::physics::Body;
use crate::timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler};

/// Effect a pickup applies on collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    /// Grant one extra life
    Life,
    /// Grant score
    Score,
    /// Temporarily boost the player's jump force
    PowerUp,
    /// Unlock the ranged weapon
    WeaponUnlock,
}

/// A collectible placed in the level
#[derive(Debug)]
pub struct Pickup {
    /// Kinematic mirror of the pickup's trigger body
    pub body: Body,
    /// Effect on collection
    pub kind: PickupKind,
    consumed: bool,
}

impl Pickup {
    /// Place a pickup in the level
    pub fn new(kind: PickupKind, position: Vec2) -> Self {
        Self {
            body: Body::new_floating(position),
            kind,
            consumed: false,
        }
    }

    /// Whether the pickup has already been collected
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Attempt to collect the pickup
    ///
    /// Returns the effect to apply on the first call and `None` on any
    /// later contact report, so a pickup can never apply twice even if
    /// the physics collaborator reports overlapping contacts before
    /// the despawn timer removes it.
    pub fn try_consume(
        &mut self,
        key: PickupKey,
        config: &PickupConfig,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) -> Option<PickupKind> {
        if self.consumed {
            return None;
        }
        self.consumed = true;
        self.body.collider_enabled = false;
        self.body.visible = false;
        events.publish(GameEvent::Anim(AnimTarget::Pickup(key), AnimSignal::PickupGet));
        scheduler.start(
            TimerKey::new(TimerOwner::Pickup(key), TimerPurpose::Despawn),
            config.destroy_delay,
            now,
        );
        Some(self.kind)
    }
}
