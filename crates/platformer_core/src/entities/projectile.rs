//! Projectile entity
//!
//! A projectile travels in a straight line until it collides or its
//! lifetime timer fires, plays a short impact effect while frozen in
//! place, then despawns. Transitions are monotonic: once impacted a
//! projectile never flies again, and repeated impact reports are
//! ignored.

use crate::config::ProjectileConfig;
use crate::entities::ProjectileKey;
use crate::events::{AnimSignal, AnimTarget, EventBus, GameEvent};
use crate::foundation::math::{sign, Vec2};
use crate::physics::{Body, BodyKind};
use crate::timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler};

/// Who fired a projectile, used to route its damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOwner {
    /// Fired by the player; damages enemies
    Player,
    /// Fired by an enemy; damages the player
    Enemy,
}

/// Request to create a projectile at the end of the current tick
#[derive(Debug, Clone, Copy)]
pub struct ProjectileSpawn {
    /// Spawn position (fire point)
    pub position: Vec2,
    /// Initial velocity
    pub velocity: Vec2,
    /// Damage routing
    pub owner: ProjectileOwner,
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectilePhase {
    /// In flight
    Alive,
    /// Frozen, playing the impact effect
    Impacted,
}

/// A projectile in flight or playing its impact effect
#[derive(Debug)]
pub struct Projectile {
    /// Kinematic mirror of the projectile's body
    pub body: Body,
    /// Damage routing
    pub owner: ProjectileOwner,
    phase: ProjectilePhase,
    facing: f32,
}

impl Projectile {
    /// Spawn a projectile and arm its lifetime timer
    pub fn spawn(
        key: ProjectileKey,
        request: &ProjectileSpawn,
        config: &ProjectileConfig,
        scheduler: &mut TimerScheduler,
        now: f32,
    ) -> Self {
        let mut projectile = Self {
            body: Body::new_floating(request.position),
            owner: request.owner,
            phase: ProjectilePhase::Alive,
            facing: 1.0,
        };
        projectile.set_velocity(request.velocity);
        scheduler.start(
            TimerKey::new(TimerOwner::Projectile(key), TimerPurpose::Lifetime),
            config.lifetime,
            now,
        );
        projectile
    }

    /// Lifecycle phase
    pub fn phase(&self) -> ProjectilePhase {
        self.phase
    }

    /// Facing sign derived from the last nonzero horizontal velocity
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// Set the velocity and orient the sprite along it
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if velocity.x != 0.0 {
            self.facing = sign(velocity.x);
        }
        self.body.velocity = velocity;
    }

    /// Freeze the projectile for its impact effect
    ///
    /// Returns true only on the Alive -> Impacted transition; repeated
    /// reports within one tick return false and change nothing. Swaps
    /// the lifetime timer for the impact-despawn timer.
    pub fn trigger_impact(
        &mut self,
        key: ProjectileKey,
        config: &ProjectileConfig,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) -> bool {
        if self.phase == ProjectilePhase::Impacted {
            return false;
        }
        self.phase = ProjectilePhase::Impacted;
        self.body.stop();
        self.body.kind = BodyKind::Static;
        self.body.collider_enabled = false;
        events.publish(GameEvent::Anim(
            AnimTarget::Projectile(key),
            AnimSignal::ProjectileImpact,
        ));
        scheduler.cancel(TimerKey::new(
            TimerOwner::Projectile(key),
            TimerPurpose::Lifetime,
        ));
        scheduler.start(
            TimerKey::new(TimerOwner::Projectile(key), TimerPurpose::ImpactDespawn),
            config.impact_delay,
            now,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    fn spawn_one() -> (ProjectileKey, Projectile, TimerScheduler) {
        let mut keys: SlotMap<ProjectileKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let mut scheduler = TimerScheduler::new();
        let request = ProjectileSpawn {
            position: Vec2::zeros(),
            velocity: Vec2::new(-5.0, 0.0),
            owner: ProjectileOwner::Player,
        };
        let projectile = Projectile::spawn(
            key,
            &request,
            &ProjectileConfig::default(),
            &mut scheduler,
            0.0,
        );
        (key, projectile, scheduler)
    }

    #[test]
    fn test_spawn_orients_facing_and_arms_lifetime() {
        let (key, projectile, scheduler) = spawn_one();
        assert_relative_eq!(projectile.facing(), -1.0);
        assert!(scheduler.is_pending(TimerKey::new(
            TimerOwner::Projectile(key),
            TimerPurpose::Lifetime
        )));
    }

    #[test]
    fn test_projectile_flies_without_gravity() {
        let (_, mut projectile, _) = spawn_one();
        projectile.body.integrate(1.0, 20.0);
        assert_relative_eq!(projectile.body.position.x, -5.0);
        assert_relative_eq!(projectile.body.position.y, 0.0);
    }

    #[test]
    fn test_impact_freezes_and_swaps_timers() {
        let (key, mut projectile, mut scheduler) = spawn_one();
        let mut events = EventBus::new();

        let newly = projectile.trigger_impact(
            key,
            &ProjectileConfig::default(),
            &mut scheduler,
            &mut events,
            0.3,
        );
        assert!(newly);
        assert_eq!(projectile.phase(), ProjectilePhase::Impacted);
        assert_eq!(projectile.body.kind, BodyKind::Static);
        assert!(!projectile.body.collider_enabled);
        assert_relative_eq!(projectile.body.velocity.norm(), 0.0);
        assert!(!scheduler.is_pending(TimerKey::new(
            TimerOwner::Projectile(key),
            TimerPurpose::Lifetime
        )));
        assert!(scheduler.is_pending(TimerKey::new(
            TimerOwner::Projectile(key),
            TimerPurpose::ImpactDespawn
        )));
    }

    #[test]
    fn test_second_impact_report_is_ignored() {
        let (key, mut projectile, mut scheduler) = spawn_one();
        let mut events = EventBus::new();
        let config = ProjectileConfig::default();

        assert!(projectile.trigger_impact(key, &config, &mut scheduler, &mut events, 0.3));
        assert!(!projectile.trigger_impact(key, &config, &mut scheduler, &mut events, 0.3));
        // Only one impact signal was published.
        let impacts = events
            .pending()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::Anim(AnimTarget::Projectile(_), AnimSignal::ProjectileImpact)
                )
            })
            .count();
        assert_eq!(impacts, 1);
    }
}
