//! Simulation world
//!
//! Owns every live object (coordinator, player, enemy/projectile/pickup
//! arenas), the clock, the scheduler and the event bus, and drives one
//! fixed tick: advance the clock, fire due timers, route the contact
//! reports queued by the physics collaborator, tick entities, integrate
//! bodies, flush deferred spawns, then dispatch the event batch.
//!
//! Entities spawned mid-tick (projectiles) are queued and inserted at
//! the end of the tick so arena iteration never observes a half-built
//! entity.

use crate::config::GameConfig;
use crate::coordinator::{GameCoordinator, GameState};
use crate::entities::enemy::{DamageKind, Enemy};
use crate::entities::pickup::{Pickup, PickupKind};
use crate::entities::player::{Player, PlayerInput};
use crate::entities::projectile::{Projectile, ProjectileOwner, ProjectilePhase, ProjectileSpawn};
use crate::entities::{EnemyKey, PickupKey, ProjectileKey};
use crate::events::{EventBus, GameEvent};
use crate::foundation::math::Vec2;
use crate::foundation::time::TickClock;
use crate::physics::{Contact, ContactBody, Tag};
use crate::timer::{TimerOwner, TimerPurpose, TimerScheduler};
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use slotmap::SlotMap;

/// How far above an enemy's center the player must be, while falling,
/// for a contact to count as a stomp instead of contact damage
const STOMP_HEIGHT_MARGIN: f32 = 0.25;

/// The whole gameplay simulation
pub struct GameWorld {
    config: GameConfig,
    clock: TickClock,
    scheduler: TimerScheduler,
    events: EventBus,
    coordinator: GameCoordinator,
    player: Option<Player>,
    enemies: SlotMap<EnemyKey, Enemy>,
    projectiles: SlotMap<ProjectileKey, Projectile>,
    pickups: SlotMap<PickupKey, Pickup>,
    contacts: Vec<Contact>,
    spawn_queue: Vec<ProjectileSpawn>,
    rng: SmallRng,
}

impl GameWorld {
    /// Create a world from validated configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a world with a fixed RNG seed for reproducible runs
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let clock = TickClock::new(config.timestep);
        let coordinator = GameCoordinator::new(config.rules.clone());
        Self {
            config,
            clock,
            scheduler: TimerScheduler::new(),
            events: EventBus::new(),
            coordinator,
            player: None,
            enemies: SlotMap::with_key(),
            projectiles: SlotMap::with_key(),
            pickups: SlotMap::with_key(),
            contacts: Vec::new(),
            spawn_queue: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The coordinator, for reading lives/score/state
    pub fn coordinator(&self) -> &GameCoordinator {
        &self.coordinator
    }

    /// The event bus, for subscribing observers
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f32 {
        self.clock.now()
    }

    /// The player, if a level is in progress
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    /// Mutable access to the player
    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.player.as_mut()
    }

    /// An enemy by key
    pub fn enemy(&self, key: EnemyKey) -> Option<&Enemy> {
        self.enemies.get(key)
    }

    /// A projectile by key
    pub fn projectile(&self, key: ProjectileKey) -> Option<&Projectile> {
        self.projectiles.get(key)
    }

    /// A pickup by key
    pub fn pickup(&self, key: PickupKey) -> Option<&Pickup> {
        self.pickups.get(key)
    }

    /// Number of live enemies in the arena
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Number of live projectiles in the arena
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Begin a session: enter Playing and reset lives and score
    pub fn start_game(&mut self) {
        self.coordinator.set_state(GameState::Playing, &mut self.events);
    }

    /// Return to the title menu, discarding all level entities
    pub fn return_to_title(&mut self) {
        self.clear_level();
        self.coordinator.set_state(GameState::Title, &mut self.events);
    }

    /// Begin a level: spawn the player at the checkpoint position
    pub fn start_level(&mut self, position: Vec2) {
        self.clear_level();
        self.player = Some(self.coordinator.start_level(
            position,
            &self.config.player,
            &mut self.events,
        ));
    }

    fn clear_level(&mut self) {
        self.player = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.contacts.clear();
        self.spawn_queue.clear();
        self.scheduler = TimerScheduler::new();
        // The timers backing in-flight effects are gone with the
        // scheduler, so the flags they would have cleared go too.
        self.coordinator.clear_transient_effects();
    }

    /// Place a ground walker
    pub fn spawn_walker(&mut self, position: Vec2) -> EnemyKey {
        self.enemies.insert(Enemy::walker(self.config.walker.clone(), position))
    }

    /// Place a floating turret
    pub fn spawn_turret(&mut self, position: Vec2) -> EnemyKey {
        self.enemies.insert(Enemy::turret(self.config.turret.clone(), position))
    }

    /// Place a pickup
    pub fn spawn_pickup(&mut self, kind: PickupKind, position: Vec2) -> PickupKey {
        self.pickups.insert(Pickup::new(kind, position))
    }

    /// Queue a contact report from the physics collaborator
    ///
    /// Contacts are resolved at the start of the next tick, after due
    /// timers have fired.
    pub fn push_contact(&mut self, contact: Contact) {
        self.contacts.push(contact);
    }

    /// Advance the simulation by one fixed tick
    ///
    /// Returns the batch of events dispatched this tick.
    pub fn tick(&mut self, input: &PlayerInput) -> Vec<GameEvent> {
        self.clock.advance();
        let now = self.clock.now();
        let dt = self.clock.dt();

        self.fire_due_timers(now);
        self.route_contacts(now);
        self.tick_entities(input, now, dt);
        self.integrate_bodies(dt);
        self.flush_spawns(now);

        self.events.dispatch()
    }

    fn fire_due_timers(&mut self, now: f32) {
        for fired in self.scheduler.drain_due(now) {
            match fired.owner {
                TimerOwner::Coordinator => {
                    self.coordinator
                        .on_timer(fired.purpose, self.player.as_mut(), &mut self.events);
                }
                TimerOwner::Player => {
                    if let Some(player) = self.player.as_mut() {
                        player.on_timer(fired.purpose, &mut self.scheduler, &mut self.events, now);
                    }
                }
                TimerOwner::Enemy(key) => match fired.purpose {
                    TimerPurpose::Despawn => {
                        debug!("Despawning enemy {key:?}");
                        self.enemies.remove(key);
                    }
                    purpose => {
                        if let Some(enemy) = self.enemies.get_mut(key) {
                            enemy.on_timer(purpose, &mut self.events, key);
                        }
                    }
                },
                TimerOwner::Projectile(key) => match fired.purpose {
                    TimerPurpose::Lifetime => {
                        // Self-expire: play the impact effect in place.
                        if let Some(projectile) = self.projectiles.get_mut(key) {
                            projectile.trigger_impact(
                                key,
                                &self.config.projectile,
                                &mut self.scheduler,
                                &mut self.events,
                                now,
                            );
                        }
                    }
                    TimerPurpose::ImpactDespawn => {
                        self.projectiles.remove(key);
                    }
                    purpose => debug!("Ignoring unexpected projectile timer {purpose:?}"),
                },
                TimerOwner::Pickup(key) => {
                    self.pickups.remove(key);
                }
            }
        }
    }

    fn route_contacts(&mut self, now: f32) {
        for contact in std::mem::take(&mut self.contacts) {
            self.route_contact(contact, now);
            // Symmetric handling: the reporter does not guarantee order.
            self.route_contact(Contact::new(contact.b, contact.a), now);
        }
    }

    fn route_contact(&mut self, contact: Contact, now: f32) {
        match (contact.a, contact.b) {
            (ContactBody::Player, ContactBody::Enemy(key)) => {
                self.player_touched_enemy(key, now);
            }
            (ContactBody::PlayerHitbox, ContactBody::Enemy(key)) => {
                self.hitbox_touched_enemy(key, now);
            }
            (ContactBody::Player, ContactBody::Pickup(key)) => {
                self.player_touched_pickup(key, now);
            }
            (ContactBody::Player, ContactBody::Zone(tag)) => {
                self.player_touched_zone(tag, now);
            }
            (ContactBody::Enemy(key), ContactBody::Zone(tag)) if tag.contains(Tag::BARRIER) => {
                if let Some(enemy) = self.enemies.get_mut(key) {
                    enemy.reverse_patrol(key, &mut self.events);
                }
            }
            (ContactBody::Projectile(key), other) => {
                self.projectile_touched(key, other, now);
            }
            _ => {}
        }
    }

    fn player_touched_enemy(&mut self, key: EnemyKey, now: f32) {
        let Some(player) = self.player.as_mut() else { return };
        if player.is_dead() {
            return;
        }
        let Some(enemy) = self.enemies.get_mut(key) else { return };
        if enemy.is_dead() || !enemy.body.collider_enabled {
            return;
        }

        let stomping = player.body.velocity.y < 0.0
            && player.body.position.y > enemy.body.position.y + STOMP_HEIGHT_MARGIN;
        if stomping {
            let amount = enemy.max_health();
            enemy.take_damage(
                key,
                amount,
                DamageKind::JumpedOn,
                &mut self.scheduler,
                &mut self.events,
                now,
            );
            // Rebound off the squashed enemy.
            player.body.velocity.y = player.jump_force;
        } else {
            self.coordinator.handle_player_hit_by_enemy(
                self.config.rules.enemy_contact_damage,
                Some(player),
                &mut self.scheduler,
                &mut self.events,
                now,
            );
        }
    }

    fn hitbox_touched_enemy(&mut self, key: EnemyKey, now: f32) {
        let Some(player) = self.player.as_ref() else { return };
        if !player.hitbox_active() {
            return;
        }
        let Some(enemy) = self.enemies.get_mut(key) else { return };
        enemy.take_damage(
            key,
            self.config.player.melee_damage as i32,
            DamageKind::Default,
            &mut self.scheduler,
            &mut self.events,
            now,
        );
    }

    fn player_touched_pickup(&mut self, key: PickupKey, now: f32) {
        let Some(player) = self.player.as_mut() else { return };
        if player.is_dead() {
            return;
        }
        let Some(pickup) = self.pickups.get_mut(key) else { return };
        let Some(kind) = pickup.try_consume(
            key,
            &self.config.pickup,
            &mut self.scheduler,
            &mut self.events,
            now,
        ) else {
            return;
        };

        match kind {
            PickupKind::Life => {
                self.coordinator.grant_life(&mut self.scheduler, &mut self.events);
            }
            PickupKind::Score => {
                self.coordinator.add_score(self.config.pickup.score_amount, &mut self.events);
            }
            PickupKind::PowerUp => {
                self.coordinator.activate_jump_force_change(
                    Some(player),
                    &mut self.scheduler,
                    &mut self.events,
                    now,
                );
            }
            PickupKind::WeaponUnlock => player.unlock_ranged_weapon(&mut self.events),
        }
    }

    fn player_touched_zone(&mut self, tag: Tag, now: f32) {
        let Some(player) = self.player.as_mut() else { return };
        // A body already in limbo reports no further deaths.
        if player.is_dead() {
            return;
        }
        if tag.contains(Tag::DEATH_ZONE) {
            self.coordinator.handle_player_death(
                Some(player),
                &mut self.scheduler,
                &mut self.events,
                now,
            );
        } else if tag.contains(Tag::WATER) {
            self.coordinator.handle_water_death(
                Some(player),
                &mut self.scheduler,
                &mut self.events,
                now,
            );
        }
    }

    fn projectile_touched(&mut self, key: ProjectileKey, other: ContactBody, now: f32) {
        let Some(projectile) = self.projectiles.get_mut(key) else { return };
        if projectile.phase() != ProjectilePhase::Alive {
            return;
        }

        match (projectile.owner, other) {
            (ProjectileOwner::Enemy, ContactBody::Player) => {
                let hit_live_player = self.player.as_ref().is_some_and(|p| !p.is_dead());
                if !hit_live_player {
                    return;
                }
                projectile.trigger_impact(
                    key,
                    &self.config.projectile,
                    &mut self.scheduler,
                    &mut self.events,
                    now,
                );
                self.coordinator.handle_player_hit_by_projectile(
                    self.config.rules.projectile_contact_damage,
                    self.player.as_mut(),
                    &mut self.scheduler,
                    &mut self.events,
                );
            }
            (ProjectileOwner::Player, ContactBody::Enemy(enemy_key)) => {
                let Some(enemy) = self.enemies.get_mut(enemy_key) else { return };
                if enemy.is_dead() {
                    return;
                }
                projectile.trigger_impact(
                    key,
                    &self.config.projectile,
                    &mut self.scheduler,
                    &mut self.events,
                    now,
                );
                enemy.take_damage(
                    enemy_key,
                    self.config.projectile.damage as i32,
                    DamageKind::Default,
                    &mut self.scheduler,
                    &mut self.events,
                    now,
                );
            }
            (_, ContactBody::Zone(tag)) if tag.contains(Tag::BARRIER) => {
                projectile.trigger_impact(
                    key,
                    &self.config.projectile,
                    &mut self.scheduler,
                    &mut self.events,
                    now,
                );
            }
            // No friendly fire in either direction.
            _ => {}
        }
    }

    fn tick_entities(&mut self, input: &PlayerInput, now: f32, dt: f32) {
        if self.coordinator.state() != GameState::Playing {
            return;
        }
        if let Some(player) = self.player.as_mut() {
            player.tick(input, &mut self.scheduler, &mut self.events, &mut self.spawn_queue, now);
        }

        let target = self
            .player
            .as_ref()
            .filter(|p| !p.is_dead())
            .map(|p| p.body.position);
        for (key, enemy) in &mut self.enemies {
            enemy.tick(
                key,
                target,
                &mut self.rng,
                &mut self.scheduler,
                &mut self.events,
                &mut self.spawn_queue,
                now,
                dt,
            );
        }
    }

    fn integrate_bodies(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        if let Some(player) = self.player.as_mut() {
            player.body.integrate(dt, gravity);
        }
        for enemy in self.enemies.values_mut() {
            enemy.body.integrate(dt, gravity);
        }
        for projectile in self.projectiles.values_mut() {
            projectile.body.integrate(dt, gravity);
        }
    }

    fn flush_spawns(&mut self, now: f32) {
        for request in std::mem::take(&mut self.spawn_queue) {
            if self.coordinator.state() != GameState::Playing {
                warn!("Dropping projectile spawn outside of play");
                continue;
            }
            self.projectiles.insert_with_key(|key| {
                Projectile::spawn(key, &request, &self.config.projectile, &mut self.scheduler, now)
            });
        }
    }
}
