//! Timed-task scheduler
//!
//! Single-threaded cooperative facility behind every delayed effect in
//! the simulation: respawn delays, the invincibility window, the
//! jump-boost duration, enemy attack/idle routines and projectile
//! lifetimes. A timer is keyed by (owner, purpose); starting a timer
//! that is already pending cancels the old one first, so re-triggered
//! effects restart their window instead of stacking or extending.

use crate::entities::{EnemyKey, PickupKey, ProjectileKey};

/// Which component a timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerOwner {
    /// The game coordinator
    Coordinator,
    /// The player entity
    Player,
    /// An enemy entity
    Enemy(EnemyKey),
    /// A projectile entity
    Projectile(ProjectileKey),
    /// A pickup entity
    Pickup(PickupKey),
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Respawn the player after an ordinary death
    Respawn,
    /// Respawn the player after the drowning struggle
    WaterRespawn,
    /// End the post-hit invincibility window
    Invincibility,
    /// End the temporary jump-force boost
    JumpBoost,
    /// Close the melee hitbox window
    AttackWindow,
    /// End the melee cooldown
    AttackCooldown,
    /// End an enemy attack routine (walker lunge)
    AttackRoutine,
    /// End an enemy idle pause
    IdlePause,
    /// Expire a projectile that never collided
    Lifetime,
    /// Remove an impacted projectile
    ImpactDespawn,
    /// Remove a dead enemy or collected pickup
    Despawn,
}

/// Identity of one timed task: (owner, purpose)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    /// Owning component
    pub owner: TimerOwner,
    /// Action on fire
    pub purpose: TimerPurpose,
}

impl TimerKey {
    /// Create a key
    pub fn new(owner: TimerOwner, purpose: TimerPurpose) -> Self {
        Self { owner, purpose }
    }
}

#[derive(Debug, Clone)]
struct Pending {
    key: TimerKey,
    fires_at: f32,
    seq: u64,
}

/// One-shot timer scheduler driven by the simulation clock
#[derive(Debug, Default)]
pub struct TimerScheduler {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl TimerScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` to fire once, `delay` seconds after `now`
    ///
    /// Any pending timer with the same key is cancelled first: the
    /// effect restarts its full window, it never stacks.
    pub fn start(&mut self, key: TimerKey, delay: f32, now: f32) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            key,
            fires_at: now + delay.max(0.0),
            seq,
        });
    }

    /// Cancel a pending timer; returns false if none was pending
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != key);
        self.pending.len() != before
    }

    /// Cancel every pending timer belonging to `owner`
    pub fn cancel_owned(&mut self, owner: TimerOwner) {
        self.pending.retain(|p| p.key.owner != owner);
    }

    /// Whether a timer with this key is pending
    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.iter().any(|p| p.key == key)
    }

    /// Seconds until the timer fires, if pending
    pub fn remaining(&self, key: TimerKey, now: f32) -> Option<f32> {
        self.pending
            .iter()
            .find(|p| p.key == key)
            .map(|p| (p.fires_at - now).max(0.0))
    }

    /// Remove and return every timer due at `now`, in deterministic
    /// (fire time, start order) order
    pub fn drain_due(&mut self, now: f32) -> Vec<TimerKey> {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.fires_at <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| {
            a.fires_at
                .partial_cmp(&b.fires_at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|p| p.key).collect()
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
