//! Enemy entities
//!
//! One enemy type with shared health/AI-state handling and per-kind
//! behavior selected by an enum: the ground walker patrols, pauses at
//! random, chases and lunges; the floating turret drifts toward the
//! player and fires projectiles at a capped rate.
//!
//! The steady-state AI rule is a pure function of distance: inside the
//! attack radius attack, inside the detection radius chase, otherwise
//! patrol. Timed routines (lunge, idle pause) override it while their
//! timer is pending, and Dead is terminal.

use crate::config::{TurretConfig, WalkerConfig};
use crate::entities::projectile::{ProjectileOwner, ProjectileSpawn};
use crate::entities::EnemyKey;
use crate::events::{AnimSignal, AnimTarget, EventBus, GameEvent};
use crate::foundation::math::{distance, sign, Vec2};
use crate::physics::Body;
use crate::timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler};
use log::debug;
use rand::Rng;

/// AI state shared by every enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    /// Wandering without a target
    Patrol,
    /// Moving toward the detected player
    Chase,
    /// Executing the kind-specific attack
    Attack,
    /// Terminal; waiting for the despawn timer
    Dead,
}

/// How damage was delivered, for the death presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    /// Melee hitbox or projectile
    Default,
    /// Player landed on top of the enemy
    JumpedOn,
}

/// Kind-specific behavior and state
#[derive(Debug)]
pub enum EnemyKind {
    /// Ground patroller that lunges at close range
    Walker {
        /// Movement settings
        config: WalkerConfig,
        /// Patrol/facing direction, +1 right or -1 left
        direction: f32,
    },
    /// Floating turret that fires projectiles at range
    Turret {
        /// Movement and firing settings
        config: TurretConfig,
        /// Patrol/facing direction, +1 right or -1 left
        direction: f32,
        /// Simulation time of the last shot
        last_shot: f32,
    },
}

/// Steady-state AI rule shared by every enemy kind
pub fn steady_state(distance: f32, detection_radius: f32, attack_radius: f32) -> AiState {
    if distance <= attack_radius {
        AiState::Attack
    } else if distance <= detection_radius {
        AiState::Chase
    } else {
        AiState::Patrol
    }
}

/// An enemy entity
#[derive(Debug)]
pub struct Enemy {
    /// Kinematic mirror of the enemy's body
    pub body: Body,
    /// Kind-specific behavior and state
    pub kind: EnemyKind,
    health: i32,
    max_health: i32,
    state: AiState,
}

impl Enemy {
    /// Spawn a ground walker patrolling rightward
    pub fn walker(config: WalkerConfig, position: Vec2) -> Self {
        Self {
            body: Body::new(position),
            health: config.max_health,
            max_health: config.max_health,
            state: AiState::Patrol,
            kind: EnemyKind::Walker {
                config,
                direction: 1.0,
            },
        }
    }

    /// Spawn a floating turret
    pub fn turret(config: TurretConfig, position: Vec2) -> Self {
        Self {
            body: Body::new_floating(position),
            health: config.max_health,
            max_health: config.max_health,
            state: AiState::Patrol,
            kind: EnemyKind::Turret {
                // Armed from the first tick.
                last_shot: -config.fire_rate,
                direction: 1.0,
                config,
            },
        }
    }

    /// Current AI state
    pub fn state(&self) -> AiState {
        self.state
    }

    /// Remaining health
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health, the damage a stomp delivers
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Whether the death transition has happened
    pub fn is_dead(&self) -> bool {
        self.state == AiState::Dead
    }

    /// Delay between death and corpse removal
    pub fn despawn_delay(&self) -> f32 {
        match &self.kind {
            EnemyKind::Walker { config, .. } => config.despawn_delay,
            EnemyKind::Turret { config, .. } => config.despawn_delay,
        }
    }

    /// Advance the enemy by one tick
    ///
    /// `player` is the alive player's position, or `None` while there
    /// is no target (menu, death limbo): every kind falls back to its
    /// patrol behavior then.
    pub fn tick<R: Rng>(
        &mut self,
        key: EnemyKey,
        player: Option<Vec2>,
        rng: &mut R,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        spawns: &mut Vec<ProjectileSpawn>,
        now: f32,
        dt: f32,
    ) {
        if self.state == AiState::Dead {
            return;
        }
        match &mut self.kind {
            EnemyKind::Walker { config, direction } => walker_tick(
                WalkerCtx {
                    body: &mut self.body,
                    state: &mut self.state,
                    config,
                    direction,
                },
                key,
                player,
                rng,
                scheduler,
                events,
                now,
                dt,
            ),
            EnemyKind::Turret {
                config,
                direction,
                last_shot,
            } => turret_tick(
                TurretCtx {
                    body: &mut self.body,
                    state: &mut self.state,
                    config,
                    direction,
                    last_shot,
                },
                key,
                player,
                events,
                spawns,
                now,
            ),
        }
    }

    /// Reverse the patrol direction (barrier contact)
    pub fn reverse_patrol(&mut self, key: EnemyKey, events: &mut EventBus) {
        if self.state == AiState::Dead {
            return;
        }
        // Kill residual velocity so a chasing enemy cannot push
        // through the barrier before the next tick re-steers it.
        match &mut self.kind {
            EnemyKind::Walker { direction, .. } => {
                *direction = -*direction;
                self.body.velocity.x = 0.0;
            }
            EnemyKind::Turret { direction, .. } => {
                *direction = -*direction;
                self.body.stop();
            }
        }
        events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::Turn));
    }

    /// Apply damage; returns true when this call killed the enemy
    ///
    /// A dead enemy absorbs nothing, so the death transition runs at
    /// most once no matter how contacts arrive.
    pub fn take_damage(
        &mut self,
        key: EnemyKey,
        amount: i32,
        damage_kind: DamageKind,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) -> bool {
        if self.state == AiState::Dead {
            return false;
        }
        self.health -= amount;
        debug!("Enemy {key:?} took {amount} damage, health {}", self.health);
        if self.health > 0 {
            events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::Impact));
            return false;
        }

        self.health = 0;
        self.state = AiState::Dead;
        self.body.stop();
        self.body.collider_enabled = false;

        let squished =
            damage_kind == DamageKind::JumpedOn && matches!(self.kind, EnemyKind::Walker { .. });
        let signal = if squished {
            AnimSignal::Squish
        } else {
            AnimSignal::Death
        };
        events.publish(GameEvent::Anim(AnimTarget::Enemy(key), signal));

        scheduler.cancel_owned(TimerOwner::Enemy(key));
        scheduler.start(
            TimerKey::new(TimerOwner::Enemy(key), TimerPurpose::Despawn),
            self.despawn_delay(),
            now,
        );
        true
    }

    /// Resolve a fired enemy timer (except Despawn, which the world
    /// handles by removing the entity)
    pub fn on_timer(&mut self, purpose: TimerPurpose, events: &mut EventBus, key: EnemyKey) {
        if self.state == AiState::Dead {
            return;
        }
        match purpose {
            TimerPurpose::AttackRoutine => {
                // Lunge over; steady state takes back over next tick.
                self.body.stop();
                self.state = AiState::Chase;
                events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::AttackEnd));
            }
            TimerPurpose::IdlePause => {
                // Patrol movement resumes on the next tick.
            }
            other => debug!("Ignoring unexpected enemy timer {other:?}"),
        }
    }
}

struct WalkerCtx<'a> {
    body: &'a mut Body,
    state: &'a mut AiState,
    config: &'a WalkerConfig,
    direction: &'a mut f32,
}

#[allow(clippy::too_many_arguments)]
fn walker_tick<R: Rng>(
    ctx: WalkerCtx<'_>,
    key: EnemyKey,
    player: Option<Vec2>,
    rng: &mut R,
    scheduler: &mut TimerScheduler,
    events: &mut EventBus,
    now: f32,
    dt: f32,
) {
    // A pending lunge overrides the steady-state rule only while the
    // player is still within attack range; once the target escapes,
    // the routine is abandoned and normal steering resumes this tick.
    let routine = TimerKey::new(TimerOwner::Enemy(key), TimerPurpose::AttackRoutine);
    if scheduler.is_pending(routine) {
        let target_in_range = player.is_some_and(|target| {
            distance(ctx.body.position, target) <= ctx.config.attack_radius
        });
        if target_in_range {
            return;
        }
        scheduler.cancel(routine);
        ctx.body.velocity.x = 0.0;
        events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::AttackEnd));
    }
    if scheduler.is_pending(TimerKey::new(TimerOwner::Enemy(key), TimerPurpose::IdlePause)) {
        ctx.body.velocity.x = 0.0;
        return;
    }

    let desired = match player {
        Some(target) => steady_state(
            distance(ctx.body.position, target),
            ctx.config.detection_radius,
            ctx.config.attack_radius,
        ),
        None => AiState::Patrol,
    };

    match desired {
        AiState::Patrol => {
            // Occasionally stop and look around.
            if rng.gen::<f32>() < ctx.config.idle_chance_per_sec * dt {
                ctx.body.velocity.x = 0.0;
                scheduler.start(
                    TimerKey::new(TimerOwner::Enemy(key), TimerPurpose::IdlePause),
                    ctx.config.idle_duration,
                    now,
                );
            } else {
                ctx.body.velocity.x = *ctx.direction * ctx.config.speed;
            }
        }
        AiState::Chase => {
            if let Some(target) = player {
                *ctx.direction = sign(target.x - ctx.body.position.x);
            }
            ctx.body.velocity.x = *ctx.direction * ctx.config.speed;
        }
        AiState::Attack => {
            if let Some(target) = player {
                *ctx.direction = sign(target.x - ctx.body.position.x);
            }
            ctx.body.velocity.x = *ctx.direction * ctx.config.lunge_speed;
            events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::AttackStart));
            scheduler.start(
                TimerKey::new(TimerOwner::Enemy(key), TimerPurpose::AttackRoutine),
                ctx.config.attack_duration,
                now,
            );
        }
        // steady_state never yields Dead
        AiState::Dead => return,
    }
    *ctx.state = desired;
}

struct TurretCtx<'a> {
    body: &'a mut Body,
    state: &'a mut AiState,
    config: &'a TurretConfig,
    direction: &'a mut f32,
    last_shot: &'a mut f32,
}

fn turret_tick(
    ctx: TurretCtx<'_>,
    key: EnemyKey,
    player: Option<Vec2>,
    events: &mut EventBus,
    spawns: &mut Vec<ProjectileSpawn>,
    now: f32,
) {
    let desired = match player {
        Some(target) => steady_state(
            distance(ctx.body.position, target),
            ctx.config.detection_radius,
            ctx.config.attack_radius,
        ),
        None => AiState::Patrol,
    };
    match desired {
        AiState::Patrol => {
            // Drift horizontally between barriers, like the walker.
            ctx.body.velocity = Vec2::new(*ctx.direction * ctx.config.speed, 0.0);
        }
        AiState::Chase => {
            // Unreachable when player is None: steady_state only runs
            // with a target.
            let Some(target) = player else { return };
            let to_target = target - ctx.body.position;
            let dist = to_target.norm();
            if dist > f32::EPSILON {
                if to_target.x != 0.0 {
                    *ctx.direction = sign(to_target.x);
                }
                ctx.body.velocity = to_target / dist * ctx.config.speed;
            }
        }
        AiState::Attack => {
            let Some(target) = player else { return };
            ctx.body.stop();
            if now - *ctx.last_shot >= ctx.config.fire_rate {
                *ctx.last_shot = now;
                let to_target = target - ctx.body.position;
                let dist = to_target.norm();
                let velocity = if dist > f32::EPSILON {
                    to_target / dist * ctx.config.projectile_speed
                } else {
                    Vec2::new(ctx.config.projectile_speed, 0.0)
                };
                events.publish(GameEvent::Anim(AnimTarget::Enemy(key), AnimSignal::AttackStart));
                spawns.push(ProjectileSpawn {
                    position: ctx.body.position,
                    velocity,
                    owner: ProjectileOwner::Enemy,
                });
            }
        }
        // steady_state never yields Dead
        AiState::Dead => return,
    }
    *ctx.state = desired;
}
