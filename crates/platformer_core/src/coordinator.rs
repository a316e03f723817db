//! Game coordinator
//!
//! Owns all global progress state: game state, lives, score and the
//! current checkpoint, plus the timed respawn, invincibility and
//! jump-boost effects. Exactly one coordinator exists per simulation
//! and it is passed explicitly to whoever needs it; there is no
//! ambient singleton. Entities never touch its fields directly, every
//! mutation goes through the public operations here.
//!
//! The player is not owned by the coordinator: operations take an
//! `Option<&mut Player>` and degrade to a logged no-op when the
//! reference is absent.

use crate::config::{PlayerConfig, RulesConfig};
use crate::entities::player::Player;
use crate::events::{AnimSignal, AnimTarget, EventBus, GameEvent, Scene};
use crate::foundation::math::Vec2;
use crate::timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler};
use log::{debug, info, warn};

/// Global game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Title menu
    Title,
    /// Gameplay in progress
    Playing,
    /// Game over presentation
    GameOver,
}

/// Central coordinator for game state, lives, score and timed effects
#[derive(Debug)]
pub struct GameCoordinator {
    rules: RulesConfig,
    state: GameState,
    lives: u32,
    score: i32,
    checkpoint: Vec2,
    invincible: bool,
}

fn coord_key(purpose: TimerPurpose) -> TimerKey {
    TimerKey::new(TimerOwner::Coordinator, purpose)
}

impl GameCoordinator {
    /// Create a coordinator in the Title state
    pub fn new(rules: RulesConfig) -> Self {
        let lives = rules.max_lives;
        Self {
            rules,
            state: GameState::Title,
            lives,
            score: 0,
            checkpoint: Vec2::zeros(),
            invincible: false,
        }
    }

    /// Current game state
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Current lives, always within `[0, max_lives]`
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Current score, never negative
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Last valid respawn point
    pub fn checkpoint(&self) -> Vec2 {
        self.checkpoint
    }

    /// Whether enemy-contact damage is currently suppressed
    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Record a new respawn point
    pub fn set_checkpoint(&mut self, position: Vec2) {
        self.checkpoint = position;
    }

    /// Transition the global game state
    ///
    /// Entering Playing resets lives and score and requests the game
    /// scene; Title and GameOver request their presentation scenes.
    /// Observers see a `StateChanged` notification either way.
    pub fn set_state(&mut self, new_state: GameState, events: &mut EventBus) {
        self.state = new_state;
        info!("State changed to {new_state:?}");

        match new_state {
            GameState::Title => {
                events.publish(GameEvent::SceneRequested(Scene::TitleMenu));
            }
            GameState::Playing => {
                self.lives = self.rules.max_lives;
                self.score = 0;
                self.invincible = false;
                info!("Stats reset: lives={} score={}", self.lives, self.score);
                events.publish(GameEvent::LivesChanged(self.lives));
                events.publish(GameEvent::ScoreChanged(self.score));
                events.publish(GameEvent::SceneRequested(Scene::GameScene));
            }
            GameState::GameOver => {
                events.publish(GameEvent::SceneRequested(Scene::GameOverMenu));
            }
        }

        events.publish(GameEvent::StateChanged(new_state));
    }

    /// Add (or with a negative amount, remove) score; never below zero
    pub fn add_score(&mut self, amount: i32, events: &mut EventBus) {
        self.score = (self.score + amount).max(0);
        debug!("Score updated: {}", self.score);
        events.publish(GameEvent::ScoreChanged(self.score));
    }

    /// Set lives, clamped to `[0, max_lives]`
    ///
    /// Reaching zero triggers the GameOver transition exactly once; a
    /// strict decrease additionally emits `LifeLost`. Observers always
    /// see `LivesChanged` with the clamped value. Entering GameOver
    /// discards every pending coordinator timer: a respawn scheduled
    /// by an earlier death must not revive the player mid-GameOver.
    pub fn set_lives(
        &mut self,
        new_lives: i32,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
    ) {
        let clamped = new_lives.clamp(0, self.rules.max_lives as i32) as u32;
        if clamped > self.lives {
            debug!("Lives capped at {clamped}");
        } else if clamped < self.lives {
            info!("Lost a life, {clamped} remaining");
            events.publish(GameEvent::LifeLost);
        }
        self.lives = clamped;
        events.publish(GameEvent::LivesChanged(self.lives));

        if self.lives == 0 && self.state != GameState::GameOver {
            info!("No lives left, game over");
            scheduler.cancel_owned(TimerOwner::Coordinator);
            self.invincible = false;
            self.set_state(GameState::GameOver, events);
        }
    }

    /// Begin a level: record the checkpoint and create the player
    pub fn start_level(
        &mut self,
        position: Vec2,
        player_config: &PlayerConfig,
        events: &mut EventBus,
    ) -> Player {
        self.checkpoint = position;
        info!("Player spawned at ({}, {})", position.x, position.y);
        events.publish(GameEvent::PlayerCreated);
        Player::new(player_config.clone(), self.rules.default_jump_force, position)
    }

    /// Player touched a death zone: lose a life and, if any remain,
    /// schedule a respawn after the short delay
    pub fn handle_player_death(
        &mut self,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) {
        info!("Player hit a death zone");
        self.begin_death(player, scheduler, events, now, false);
    }

    /// Player touched water: lose a life and, if any remain, schedule
    /// a respawn after the longer struggle delay
    pub fn handle_water_death(
        &mut self,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) {
        info!("Player drowned");
        self.begin_death(player, scheduler, events, now, true);
    }

    fn begin_death(
        &mut self,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
        water: bool,
    ) {
        self.set_lives(self.lives as i32 - 1, scheduler, events);
        if self.lives == 0 {
            return;
        }
        match player {
            Some(p) => p.enter_death_limbo(water, events),
            None => warn!("Death handling with no player reference, skipping respawn setup"),
        }
        let (purpose, delay) = if water {
            (TimerPurpose::WaterRespawn, self.rules.water_death_delay)
        } else {
            (TimerPurpose::Respawn, self.rules.respawn_delay)
        };
        scheduler.start(coord_key(purpose), delay, now);
    }

    /// Player touched an enemy
    ///
    /// Suppressed entirely while invincible. Otherwise lives drop by
    /// `damage` and, if the player survives, an invincibility window
    /// opens during which further enemy-contact damage is ignored.
    pub fn handle_player_hit_by_enemy(
        &mut self,
        damage: u32,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) {
        if self.invincible {
            debug!("Enemy contact ignored, player is invincible");
            return;
        }
        info!("Player hit by enemy for {damage}");
        self.set_lives(self.lives as i32 - damage as i32, scheduler, events);
        if self.lives > 0 {
            if player.is_some() {
                events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::Impact));
            } else {
                warn!("Enemy hit with no player reference");
            }
            // Restarting the window is intentional: a fresh hit after
            // it elapsed opens a fresh full-length window.
            self.invincible = true;
            scheduler.start(
                coord_key(TimerPurpose::Invincibility),
                self.rules.invincible_time,
                now,
            );
        }
    }

    /// Player hit by an enemy projectile
    ///
    /// Projectile damage is never suppressed by invincibility; the
    /// asymmetry with enemy contact is deliberate.
    pub fn handle_player_hit_by_projectile(
        &mut self,
        damage: u32,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
    ) {
        info!("Player hit by projectile for {damage}");
        self.set_lives(self.lives as i32 - damage as i32, scheduler, events);
        if self.lives > 0 && player.is_some() {
            events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::Impact));
        }
    }

    /// Start (or restart) the temporary jump-force boost
    ///
    /// If a boost is already running it is cancelled and the default
    /// force restored before the new boost starts, so the duration
    /// resets rather than stacking or extending.
    pub fn activate_jump_force_change(
        &mut self,
        player: Option<&mut Player>,
        scheduler: &mut TimerScheduler,
        events: &mut EventBus,
        now: f32,
    ) {
        let Some(player) = player else {
            warn!("Jump boost requested with no player reference, ignoring");
            return;
        };
        let key = coord_key(TimerPurpose::JumpBoost);
        if scheduler.cancel(key) {
            player.jump_force = self.rules.default_jump_force;
        }
        player.jump_force = self.rules.boosted_jump_force;
        info!("Jump force increased to {}", player.jump_force);
        events.publish(GameEvent::Anim(AnimTarget::Player, AnimSignal::JumpBoost));
        scheduler.start(key, self.rules.boost_duration, now);
    }

    /// Grant one extra life (Life pickup)
    pub fn grant_life(&mut self, scheduler: &mut TimerScheduler, events: &mut EventBus) {
        self.set_lives(self.lives as i32 + 1, scheduler, events);
    }

    /// Drop transient timed effects whose backing timers are gone
    ///
    /// Called when a level is torn down and its scheduler discarded;
    /// without this an in-flight invincibility window would latch on
    /// forever.
    pub fn clear_transient_effects(&mut self) {
        self.invincible = false;
    }

    /// Resolve a fired coordinator timer
    pub fn on_timer(
        &mut self,
        purpose: TimerPurpose,
        player: Option<&mut Player>,
        events: &mut EventBus,
    ) {
        match purpose {
            TimerPurpose::Respawn | TimerPurpose::WaterRespawn => match player {
                Some(p) => {
                    p.respawn_at(self.checkpoint, events);
                    info!(
                        "Player respawned at ({}, {})",
                        self.checkpoint.x, self.checkpoint.y
                    );
                }
                None => warn!("Respawn timer fired with no player reference"),
            },
            TimerPurpose::Invincibility => {
                self.invincible = false;
                debug!("Invincibility window closed");
            }
            TimerPurpose::JumpBoost => match player {
                Some(p) => {
                    p.jump_force = self.rules.default_jump_force;
                    info!("Jump force reset to {}", p.jump_force);
                }
                None => warn!("Jump boost expiry with no player reference"),
            },
            other => debug!("Ignoring unexpected coordinator timer {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;

    fn setup() -> (GameCoordinator, TimerScheduler, EventBus) {
        let mut events = EventBus::new();
        let mut coordinator = GameCoordinator::new(RulesConfig::default());
        coordinator.set_state(GameState::Playing, &mut events);
        events.dispatch();
        (coordinator, TimerScheduler::new(), events)
    }

    fn make_player(coordinator: &mut GameCoordinator, events: &mut EventBus) -> Player {
        coordinator.start_level(Vec2::new(1.0, 2.0), &PlayerConfig::default(), events)
    }

    #[test]
    fn test_lives_always_clamped() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        coordinator.set_lives(99, &mut scheduler, &mut events);
        assert_eq!(coordinator.lives(), 3);
        coordinator.set_state(GameState::Playing, &mut events);
        coordinator.set_lives(-5, &mut scheduler, &mut events);
        assert_eq!(coordinator.lives(), 0);
    }

    #[test]
    fn test_zero_lives_triggers_game_over_exactly_once() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        coordinator.set_lives(0, &mut scheduler, &mut events);
        coordinator.set_lives(0, &mut scheduler, &mut events);
        coordinator.set_lives(-1, &mut scheduler, &mut events);
        let batch = events.dispatch();
        let game_overs = batch
            .iter()
            .filter(|e| matches!(e, GameEvent::StateChanged(GameState::GameOver)))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(coordinator.state(), GameState::GameOver);
    }

    #[test]
    fn test_three_deaths_yield_two_one_zero_then_game_over() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);

        let mut seen = Vec::new();
        for _ in 0..3 {
            coordinator.handle_player_death(
                Some(&mut player),
                &mut scheduler,
                &mut events,
                0.0,
            );
            seen.push(coordinator.lives());
        }
        assert_eq!(seen, vec![2, 1, 0]);
        assert_eq!(coordinator.state(), GameState::GameOver);
        // No respawn scheduled once lives are exhausted.
        assert!(!scheduler.is_pending(coord_key(TimerPurpose::Respawn)));
    }

    #[test]
    fn test_game_over_discards_stale_respawn_timer() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);

        // The second death re-arms the respawn timer; the third must
        // cancel it along with the GameOver transition, so ticking on
        // in GameOver never revives the player.
        for _ in 0..3 {
            coordinator.handle_player_death(Some(&mut player), &mut scheduler, &mut events, 0.0);
        }
        assert!(scheduler.is_empty());

        for fired in scheduler.drain_due(10.0) {
            coordinator.on_timer(fired.purpose, Some(&mut player), &mut events);
        }
        assert!(player.is_dead());
        assert_eq!(coordinator.state(), GameState::GameOver);
    }

    #[test]
    fn test_clear_transient_effects_drops_invincibility() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);
        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert!(coordinator.is_invincible());

        coordinator.clear_transient_effects();
        assert!(!coordinator.is_invincible());
    }

    #[test]
    fn test_life_lost_emitted_only_on_strict_decrease() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        events.dispatch();
        coordinator.set_lives(3, &mut scheduler, &mut events);
        coordinator.set_lives(2, &mut scheduler, &mut events);
        let batch = events.dispatch();
        let losses = batch.iter().filter(|e| matches!(e, GameEvent::LifeLost)).count();
        assert_eq!(losses, 1);
    }

    #[test]
    fn test_add_score_floors_at_zero() {
        let (mut coordinator, _, mut events) = setup();
        coordinator.add_score(10, &mut events);
        coordinator.add_score(-50, &mut events);
        assert_eq!(coordinator.score(), 0);
        coordinator.add_score(7, &mut events);
        assert_eq!(coordinator.score(), 7);
    }

    #[test]
    fn test_enemy_hit_opens_invincibility_window() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);

        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert_eq!(coordinator.lives(), 2);
        assert!(coordinator.is_invincible());

        // Second contact inside the window is ignored entirely.
        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.5);
        assert_eq!(coordinator.lives(), 2);
    }

    #[test]
    fn test_invincibility_ends_exactly_at_window() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);
        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.0);

        // Hit at t = window - epsilon: timer not yet due, still ignored.
        for key in scheduler.drain_due(0.999) {
            coordinator.on_timer(key.purpose, Some(&mut player), &mut events);
        }
        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.999);
        assert_eq!(coordinator.lives(), 2);

        // Hit at t = window + epsilon: window closed, damage applies.
        for key in scheduler.drain_due(1.001) {
            coordinator.on_timer(key.purpose, Some(&mut player), &mut events);
        }
        assert!(!coordinator.is_invincible());
        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 1.001);
        assert_eq!(coordinator.lives(), 1);
    }

    #[test]
    fn test_projectile_damage_ignores_invincibility() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);

        coordinator.handle_player_hit_by_enemy(1, Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert!(coordinator.is_invincible());

        coordinator.handle_player_hit_by_projectile(1, Some(&mut player), &mut scheduler, &mut events);
        assert_eq!(coordinator.lives(), 1);
    }

    #[test]
    fn test_jump_boost_resets_duration_instead_of_stacking() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);
        let key = coord_key(TimerPurpose::JumpBoost);

        coordinator.activate_jump_force_change(Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert!((player.jump_force - 14.0).abs() < f32::EPSILON);

        // Re-trigger two seconds in; remaining window becomes 5s again.
        coordinator.activate_jump_force_change(Some(&mut player), &mut scheduler, &mut events, 2.0);
        assert_eq!(scheduler.remaining(key, 2.0), Some(5.0));

        // At t = old remaining + 1 = 4s the boost must still be live.
        assert!(scheduler.drain_due(4.0).is_empty());
        assert!((player.jump_force - 14.0).abs() < f32::EPSILON);

        // And it expires exactly 5s after the second trigger.
        for fired in scheduler.drain_due(7.0) {
            coordinator.on_timer(fired.purpose, Some(&mut player), &mut events);
        }
        assert!((player.jump_force - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_operations_without_player_are_no_ops() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        coordinator.activate_jump_force_change(None, &mut scheduler, &mut events, 0.0);
        assert!(!scheduler.is_pending(coord_key(TimerPurpose::JumpBoost)));

        // Death without a player still books the life loss but cannot
        // stage the respawn limbo.
        coordinator.handle_player_death(None, &mut scheduler, &mut events, 0.0);
        assert_eq!(coordinator.lives(), 2);
    }

    #[test]
    fn test_entering_playing_resets_stats() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        coordinator.add_score(50, &mut events);
        coordinator.set_lives(1, &mut scheduler, &mut events);
        coordinator.set_state(GameState::Playing, &mut events);
        assert_eq!(coordinator.lives(), 3);
        assert_eq!(coordinator.score(), 0);
    }

    #[test]
    fn test_water_death_uses_longer_delay() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);
        coordinator.handle_water_death(Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert_eq!(
            scheduler.remaining(coord_key(TimerPurpose::WaterRespawn), 0.0),
            Some(5.0)
        );
        assert!(player.is_dead());
    }

    #[test]
    fn test_respawn_restores_player_at_checkpoint() {
        let (mut coordinator, mut scheduler, mut events) = setup();
        let mut player = make_player(&mut coordinator, &mut events);
        coordinator.handle_player_death(Some(&mut player), &mut scheduler, &mut events, 0.0);
        assert!(player.is_dead());

        for fired in scheduler.drain_due(3.0) {
            coordinator.on_timer(fired.purpose, Some(&mut player), &mut events);
        }
        assert!(!player.is_dead());
        assert!((player.body.position.x - 1.0).abs() < f32::EPSILON);
        assert!((player.body.position.y - 2.0).abs() < f32::EPSILON);
    }
}
