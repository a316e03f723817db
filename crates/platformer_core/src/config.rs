//! Game configuration
//!
//! All gameplay tunables live here: movement speeds, detection radii,
//! damage values and every timed-effect duration. Configuration is
//! loaded from a RON file when present and falls back to compiled-in
//! defaults otherwise. Defective values (non-positive max health or
//! fire rate) never propagate as failures: `validated` replaces them
//! with hard-coded defaults and logs a warning.

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Top-level game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Global rules owned by the coordinator
    pub rules: RulesConfig,

    /// Player movement and combat settings
    pub player: PlayerConfig,

    /// Ground walker enemy settings
    pub walker: WalkerConfig,

    /// Airborne ranged turret settings
    pub turret: TurretConfig,

    /// Projectile lifecycle settings
    pub projectile: ProjectileConfig,

    /// Pickup settings
    pub pickup: PickupConfig,

    /// Downward gravity acceleration applied to dynamic bodies
    pub gravity: f32,

    /// Fixed simulation timestep in seconds
    pub timestep: f32,
}

/// Coordinator-owned rules: lives, timed windows, jump boost
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum (and starting) number of lives
    pub max_lives: u32,

    /// Delay before respawning after an ordinary death
    pub respawn_delay: f32,

    /// Longer "struggle" delay before respawning after drowning
    pub water_death_delay: f32,

    /// Invincibility window after enemy-contact damage
    pub invincible_time: f32,

    /// Default player jump force
    pub default_jump_force: f32,

    /// Jump force while the power-up boost is active
    pub boosted_jump_force: f32,

    /// Duration of the jump-force boost
    pub boost_duration: f32,

    /// Lives lost when an enemy touches the player
    pub enemy_contact_damage: u32,

    /// Lives lost when an enemy projectile hits the player
    pub projectile_contact_damage: u32,
}

/// Player movement and combat settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal speed while walking
    pub walk_speed: f32,

    /// Horizontal speed while the run modifier is held
    pub run_speed: f32,

    /// Maximum number of jumps before touching ground again
    pub jump_limit: u32,

    /// Damage applied by the melee hitbox
    pub melee_damage: u32,

    /// Duration the melee hitbox stays enabled (animation window)
    pub attack_window: f32,

    /// Cooldown after an attack before the next one is allowed
    pub attack_cooldown: f32,

    /// Speed of player-fired projectiles
    pub projectile_speed: f32,

    /// Horizontal offset of the melee hitbox from the player center
    pub hitbox_offset_x: f32,

    /// Vertical offset of the melee hitbox from the player center
    pub hitbox_offset_y: f32,
}

/// Ground walker enemy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Maximum health
    pub max_health: i32,

    /// Patrol/chase speed
    pub speed: f32,

    /// Horizontal speed during the attack lunge
    pub lunge_speed: f32,

    /// Duration of the lunge attack routine
    pub attack_duration: f32,

    /// Probability per second of entering a timed idle pause
    pub idle_chance_per_sec: f32,

    /// Duration of the idle pause
    pub idle_duration: f32,

    /// Distance at which the walker starts chasing
    pub detection_radius: f32,

    /// Distance at which the walker lunges
    pub attack_radius: f32,

    /// Delay before the corpse is removed (death animation window)
    pub despawn_delay: f32,
}

/// Airborne ranged turret settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretConfig {
    /// Maximum health
    pub max_health: i32,

    /// Float speed while patrolling or chasing
    pub speed: f32,

    /// Distance at which the turret starts chasing
    pub detection_radius: f32,

    /// Distance at which the turret holds position and fires
    pub attack_radius: f32,

    /// Minimum seconds between shots
    pub fire_rate: f32,

    /// Speed of turret-fired projectiles
    pub projectile_speed: f32,

    /// Delay before the corpse is removed (death animation window)
    pub despawn_delay: f32,
}

/// Projectile lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Seconds before a projectile self-impacts without colliding
    pub lifetime: f32,

    /// Delay between impact and removal (impact animation window)
    pub impact_delay: f32,

    /// Damage a player projectile applies to an enemy
    pub damage: u32,
}

/// Pickup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// Score granted by a Score pickup
    pub score_amount: i32,

    /// Delay before a collected pickup is removed (effect window)
    pub destroy_delay: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            player: PlayerConfig::default(),
            walker: WalkerConfig::default(),
            turret: TurretConfig::default(),
            projectile: ProjectileConfig::default(),
            pickup: PickupConfig::default(),
            gravity: 20.0,
            timestep: 1.0 / 60.0,
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            respawn_delay: 3.0,
            water_death_delay: 5.0,
            invincible_time: 1.0,
            default_jump_force: 8.0,
            boosted_jump_force: 14.0,
            boost_duration: 5.0,
            enemy_contact_damage: 1,
            projectile_contact_damage: 1,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 6.0,
            jump_limit: 2,
            melee_damage: 3,
            attack_window: 0.4,
            attack_cooldown: 0.6,
            projectile_speed: 5.0,
            hitbox_offset_x: 0.6,
            hitbox_offset_y: 0.0,
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_health: 5,
            speed: 2.0,
            lunge_speed: 4.0,
            attack_duration: 0.6,
            idle_chance_per_sec: 0.2,
            idle_duration: 1.0,
            detection_radius: 6.0,
            attack_radius: 1.5,
            despawn_delay: 0.5,
        }
    }
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            max_health: 5,
            speed: 1.0,
            detection_radius: 6.0,
            attack_radius: 4.0,
            fire_rate: 2.0,
            projectile_speed: 5.0,
            despawn_delay: 0.5,
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime: 1.0,
            impact_delay: 0.5,
            damage: 10,
        }
    }
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            score_amount: 10,
            destroy_delay: 0.25,
        }
    }
}

impl GameConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = ron::from_str(&text)?;
        Ok(config)
    }

    /// Load configuration from a RON file, falling back to defaults
    /// (with a warning) when the file is missing or malformed
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Using default config, could not load {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Replace defective values with hard-coded defaults
    ///
    /// Configuration defects are never fatal: the simulation runs at
    /// degraded fidelity with the replaced values instead.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if self.walker.max_health <= 0 {
            warn!(
                "Walker max health must be greater than 0, using default of {}",
                WalkerConfig::default().max_health
            );
            self.walker.max_health = WalkerConfig::default().max_health;
        }
        if self.turret.max_health <= 0 {
            warn!(
                "Turret max health must be greater than 0, using default of {}",
                TurretConfig::default().max_health
            );
            self.turret.max_health = TurretConfig::default().max_health;
        }
        if self.turret.fire_rate <= 0.0 {
            warn!(
                "Turret fire rate must be greater than 0, using default of {}",
                TurretConfig::default().fire_rate
            );
            self.turret.fire_rate = TurretConfig::default().fire_rate;
        }
        if self.walker.attack_radius >= self.walker.detection_radius {
            warn!("Walker attack radius must be below detection radius, shrinking it");
            self.walker.attack_radius = self.walker.detection_radius * 0.5;
        }
        if self.turret.attack_radius >= self.turret.detection_radius {
            warn!("Turret attack radius must be below detection radius, shrinking it");
            self.turret.attack_radius = self.turret.detection_radius * 0.5;
        }
        for delay in [
            &mut self.rules.respawn_delay,
            &mut self.rules.water_death_delay,
            &mut self.rules.invincible_time,
            &mut self.rules.boost_duration,
            &mut self.projectile.lifetime,
            &mut self.projectile.impact_delay,
            &mut self.pickup.destroy_delay,
        ] {
            if *delay < 0.0 {
                warn!("Negative duration in config, clamping to 0");
                *delay = 0.0;
            }
        }
        self
    }
}
