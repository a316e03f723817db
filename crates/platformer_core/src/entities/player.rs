//! Player behavior controller
//!
//! Continuous movement composed with a small melee-combat state
//! machine (Idle, Attacking, Cooldown). The player never books lives
//! or score itself: death/water contacts are delegated to the
//! coordinator, which also owns the respawn and jump-boost timers.
//!
//! Missing sub-components degrade features instead of failing the
//! entity: without a ground sensor jumping is disabled, without a
//! weapon mount shooting is disabled.

use crate::config::PlayerConfig;
use crate::entities::projectile::{ProjectileOwner, ProjectileSpawn};
use crate::events::{AnimSignal, AnimTarget, EventBus, GameEvent};
use crate::foundation::math::Vec2;
use crate::physics::{Body, BodyKind};
use crate::timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler};
use log::{debug, warn};

/// Input sampled by the external input collaborator for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Horizontal axis in `[-1, 1]`
    pub axis: f32,
    /// Run modifier held
    pub run: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Primary (melee) action pressed this tick
    pub attack: bool,
    /// Secondary (ranged) action pressed this tick
    pub shoot: bool,
}

/// Melee combat state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatState {
    /// Ready to attack
    Idle,
    /// Hitbox enabled for the animation window
    Attacking,
    /// Waiting out the cooldown
    Cooldown,
}

/// Mount point for the ranged weapon
#[derive(Debug, Clone, Copy)]
pub struct WeaponMount {
    /// Fire-point offset from the player center, for rightward facing
    pub offset: Vec2,
}

impl Default for WeaponMount {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.5, 0.2),
        }
    }
}

/// The player entity
#[derive(Debug)]
pub struct Player {
    /// Kinematic mirror of the player's rigid body
    pub body: Body,
    /// Current jump impulse; temporarily overridden by power-ups
    pub jump_force: f32,
    config: PlayerConfig,
    jump_count: u32,
    was_grounded: bool,
    facing: f32,
    combat: CombatState,
    hitbox_active: bool,
    has_ranged_weapon: bool,
    weapon: Option<WeaponMount>,
    has_ground_sensor: bool,
    is_dead: bool,
    warned_no_sensor: bool,
    warned_no_weapon: bool,
}

fn player_key(purpose: TimerPurpose) -> TimerKey {
    TimerKey::new(TimerOwner::Player, purpose)
}

impl Player {
    /// Create a player at a position with all sub-components attached
    pub fn new(config: PlayerConfig, jump_force: f32, position: Vec2) -> Self {
        Self {
            body: Body::new(position),
            jump_force,
            config,
            jump_count: 0,
            was_grounded: false,
            facing: 1.0,
            combat: CombatState::Idle,
            hitbox_active: false,
            has_ranged_weapon: false,
            weapon: Some(WeaponMount::default()),
            has_ground_sensor: true,
            is_dead: false,
            warned_no_sensor: false,
            warned_no_weapon: false,
        }
    }

    /// Drop the ground sensor (jumping becomes unavailable)
    #[must_use]
    pub fn without_ground_sensor(mut self) -> Self {
        self.has_ground_sensor = false;
        self
    }

    /// Drop the weapon mount (shooting becomes unavailable)
    #[must_use]
    pub fn without_weapon_mount(mut self) -> Self {
        self.weapon = None;
        self
    }

    /// Facing sign, +1 right or -1 left
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// Current melee combat state
    pub fn combat_state(&self) -> CombatState {
        self.combat
    }

    /// Whether the melee hitbox currently deals damage
    pub fn hitbox_active(&self) -> bool {
        self.hitbox_active
    }

    /// Number of jumps since last grounded
    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    /// Whether input processing is suspended by a death sequence
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    /// Whether the ranged weapon has been unlocked
    pub fn has_ranged_weapon(&self) -> bool {
        self.has_ranged_weapon
    }

    /// Unlock the ranged weapon (WeaponUnlock pickup)
    pub fn unlock_ranged_weapon(&mut self, events: &mut EventBus) {
        self.has_ranged_weapon = true;
        events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::WeaponUnlocked));
    }

    /// Melee hitbox offset mirrored to the current facing
    pub fn hitbox_offset(&self) -> Vec2 {
        Vec2::new(
            self.config.hitbox_offset_x.abs() * self.facing,
            self.config.hitbox_offset_y,
        )
    }

    /// World position of the melee hitbox
    pub fn hitbox_position(&self) -> Vec2 {
        self.body.position + self.hitbox_offset()
    }

    /// Advance the player by one tick
    pub fn tick(
        &mut self,
        input: &PlayerInput,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        spawns: &mut Vec<ProjectileSpawn>,
        now: f32,
    ) {
        if self.is_dead {
            return;
        }

        self.update_grounding();
        self.apply_movement(input);

        if input.jump {
            self.try_jump(events);
        }
        if input.attack {
            self.try_melee(scheduler, events, now);
        }
        if input.shoot {
            self.try_shoot(spawns);
        }
    }

    fn update_grounding(&mut self) {
        let grounded = self.has_ground_sensor && self.body.grounded;
        // Landing is the sole reset path for the jump counter.
        if grounded && !self.was_grounded {
            debug!("Player landed");
            self.jump_count = 0;
        }
        self.was_grounded = grounded;
    }

    fn apply_movement(&mut self, input: &PlayerInput) {
        let speed = if input.run {
            self.config.run_speed
        } else {
            self.config.walk_speed
        };
        self.body.velocity.x = input.axis * speed;
        if input.axis > 0.0 {
            self.facing = 1.0;
        } else if input.axis < 0.0 {
            self.facing = -1.0;
        }
    }

    fn try_jump(&mut self, events: &mut EventBus) {
        if !self.has_ground_sensor {
            if !self.warned_no_sensor {
                warn!("No ground sensor attached, jumping disabled");
                self.warned_no_sensor = true;
            }
            return;
        }
        if self.jump_count >= self.config.jump_limit {
            return;
        }
        // Reset vertical velocity before applying the impulse.
        self.body.velocity.y = 0.0;
        self.body.velocity.y += self.jump_force;
        self.jump_count += 1;

        let signal = if self.jump_count == 1 {
            AnimSignal::Jump
        } else {
            AnimSignal::DoubleJump
        };
        events.publish(GameEvent::Anim(AnimTarget::Player, signal));
    }

    fn try_melee(&mut self, scheduler: &mut TimerScheduler, events: &mut EventBus, now: f32) {
        if self.combat != CombatState::Idle {
            return;
        }
        self.combat = CombatState::Attacking;
        self.hitbox_active = true;
        events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::AttackStart));
        scheduler.start(
            player_key(TimerPurpose::AttackWindow),
            self.config.attack_window,
            now,
        );
    }

    fn try_shoot(&mut self, spawns: &mut Vec<ProjectileSpawn>) {
        if !self.has_ranged_weapon {
            debug!("Ranged attack ignored, weapon not unlocked");
            return;
        }
        let Some(mount) = self.weapon else {
            if !self.warned_no_weapon {
                warn!("No weapon mount attached, shooting disabled");
                self.warned_no_weapon = true;
            }
            return;
        };
        let fire_point = self.body.position
            + Vec2::new(mount.offset.x * self.facing, mount.offset.y);
        spawns.push(ProjectileSpawn {
            position: fire_point,
            velocity: Vec2::new(self.facing * self.config.projectile_speed, 0.0),
            owner: ProjectileOwner::Player,
        });
    }

    /// Resolve a fired player timer
    pub fn on_timer(
        &mut self,
        purpose: TimerPurpose,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) {
        match purpose {
            TimerPurpose::AttackWindow => {
                self.hitbox_active = false;
                self.combat = CombatState::Cooldown;
                events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::AttackEnd));
                scheduler.start(
                    player_key(TimerPurpose::AttackCooldown),
                    self.config.attack_cooldown,
                    now,
                );
            }
            TimerPurpose::AttackCooldown => {
                self.combat = CombatState::Idle;
            }
            other => debug!("Ignoring unexpected player timer {other:?}"),
        }
    }

    /// Suspend the player for a scripted death sequence
    ///
    /// Freezes and (for ordinary deaths) hides the body; water deaths
    /// keep the body visible while the struggle plays out.
    pub fn enter_death_limbo(&mut self, water: bool, events: &mut EventBus) {
        self.is_dead = true;
        self.body.stop();
        self.body.kind = BodyKind::Kinematic;
        if water {
            events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::StruggleInWater));
        } else {
            self.body.visible = false;
            events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::Death));
        }
    }

    /// Restore the player at the checkpoint after a respawn delay
    pub fn respawn_at(&mut self, checkpoint: Vec2, _events: &mut EventBus) {
        self.body.position = checkpoint;
        self.body.stop();
        self.body.kind = BodyKind::Dynamic;
        self.body.visible = true;
        self.is_dead = false;
        self.jump_count = 0;
        self.combat = CombatState::Idle;
        self.hitbox_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_player() -> Player {
        Player::new(PlayerConfig::default(), 8.0, Vec2::zeros())
    }

    fn ctx() -> (TimerScheduler, EventBus, Vec<ProjectileSpawn>) {
        (TimerScheduler::new(), EventBus::new(), Vec::new())
    }

    #[test]
    fn test_walk_and_run_speed() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();

        let walk = PlayerInput { axis: 1.0, ..Default::default() };
        player.tick(&walk, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_relative_eq!(player.body.velocity.x, 4.0);

        let run = PlayerInput { axis: -1.0, run: true, ..Default::default() };
        player.tick(&run, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_relative_eq!(player.body.velocity.x, -6.0);
        assert_relative_eq!(player.facing(), -1.0);
    }

    #[test]
    fn test_hitbox_offset_mirrors_facing() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        assert!(player.hitbox_offset().x > 0.0);

        let left = PlayerInput { axis: -1.0, ..Default::default() };
        player.tick(&left, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert!(player.hitbox_offset().x < 0.0);
    }

    #[test]
    fn test_jump_limit_and_signals() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        let jump = PlayerInput { jump: true, ..Default::default() };

        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        // Third press exceeds the limit of 2 and is ignored.
        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(player.jump_count(), 2);

        let batch = events.dispatch();
        assert!(batch.contains(&GameEvent::Anim(AnimTarget::Player, AnimSignal::Jump)));
        assert!(batch.contains(&GameEvent::Anim(AnimTarget::Player, AnimSignal::DoubleJump)));
    }

    #[test]
    fn test_jump_resets_vertical_velocity_first() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        player.body.velocity.y = -12.0;

        let jump = PlayerInput { jump: true, ..Default::default() };
        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_relative_eq!(player.body.velocity.y, 8.0);
    }

    #[test]
    fn test_landing_is_sole_jump_reset_path() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        let jump = PlayerInput { jump: true, ..Default::default() };
        let idle = PlayerInput::default();

        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(player.jump_count(), 2);

        // Time passing alone never resets the counter.
        for _ in 0..100 {
            player.tick(&idle, &mut scheduler, &mut events, &mut spawns, 0.0);
        }
        assert_eq!(player.jump_count(), 2);

        // The not-grounded -> grounded transition does.
        player.body.grounded = true;
        player.tick(&idle, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(player.jump_count(), 0);
    }

    #[test]
    fn test_missing_ground_sensor_disables_jump() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player().without_ground_sensor();
        player.body.grounded = true;

        let jump = PlayerInput { jump: true, ..Default::default() };
        player.tick(&jump, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(player.jump_count(), 0);
        assert_relative_eq!(player.body.velocity.y, 0.0);
    }

    #[test]
    fn test_melee_cycle_idle_attacking_cooldown_idle() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        let attack = PlayerInput { attack: true, ..Default::default() };

        player.tick(&attack, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(player.combat_state(), CombatState::Attacking);
        assert!(player.hitbox_active());

        // Attacking again before the window closes changes nothing.
        player.tick(&attack, &mut scheduler, &mut events, &mut spawns, 0.1);

        for fired in scheduler.drain_due(0.4) {
            player.on_timer(fired.purpose, &mut scheduler, &mut events, 0.4);
        }
        assert_eq!(player.combat_state(), CombatState::Cooldown);
        assert!(!player.hitbox_active());

        // Attacks during cooldown are blocked.
        player.tick(&attack, &mut scheduler, &mut events, &mut spawns, 0.5);
        assert_eq!(player.combat_state(), CombatState::Cooldown);

        for fired in scheduler.drain_due(1.0) {
            player.on_timer(fired.purpose, &mut scheduler, &mut events, 1.0);
        }
        assert_eq!(player.combat_state(), CombatState::Idle);
    }

    #[test]
    fn test_shoot_requires_unlock_and_mount() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let shoot = PlayerInput { shoot: true, ..Default::default() };

        let mut player = make_player();
        player.tick(&shoot, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert!(spawns.is_empty());

        player.unlock_ranged_weapon(&mut events);
        player.tick(&shoot, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_eq!(spawns.len(), 1);
        assert!(spawns[0].velocity.x > 0.0);

        let mut unarmed = make_player().without_weapon_mount();
        unarmed.unlock_ranged_weapon(&mut events);
        let mut no_spawns = Vec::new();
        unarmed.tick(&shoot, &mut scheduler, &mut events, &mut no_spawns, 0.0);
        assert!(no_spawns.is_empty());
    }

    #[test]
    fn test_projectile_fires_along_facing() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        player.unlock_ranged_weapon(&mut events);

        let left = PlayerInput { axis: -1.0, shoot: true, ..Default::default() };
        player.tick(&left, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert!(spawns[0].velocity.x < 0.0);
        assert!(spawns[0].position.x < 0.0);
    }

    #[test]
    fn test_dead_player_ignores_input() {
        let (mut scheduler, mut events, mut spawns) = ctx();
        let mut player = make_player();
        player.enter_death_limbo(false, &mut events);

        let busy = PlayerInput { axis: 1.0, jump: true, attack: true, ..Default::default() };
        player.tick(&busy, &mut scheduler, &mut events, &mut spawns, 0.0);
        assert_relative_eq!(player.body.velocity.x, 0.0);
        assert_eq!(player.jump_count(), 0);
        assert_eq!(player.combat_state(), CombatState::Idle);
    }

    #[test]
    fn test_death_limbo_freezes_and_hides_body() {
        let (_, mut events, _) = ctx();
        let mut player = make_player();
        player.body.velocity = Vec2::new(3.0, 3.0);

        player.enter_death_limbo(false, &mut events);
        assert_eq!(player.body.kind, BodyKind::Kinematic);
        assert!(!player.body.visible);
        assert_relative_eq!(player.body.velocity.norm(), 0.0);

        player.respawn_at(Vec2::new(5.0, 1.0), &mut events);
        assert_eq!(player.body.kind, BodyKind::Dynamic);
        assert!(player.body.visible);
        assert!(!player.is_dead());
        assert_relative_eq!(player.body.position.x, 5.0);
    }
}
