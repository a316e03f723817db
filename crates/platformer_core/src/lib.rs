//! # Platformer Core
//!
//! Real-time gameplay simulation core for a 2D platformer.
//!
//! The crate owns the game rules only: a game-state coordinator
//! (lives, score, checkpoints, timed respawn/invincibility/power-up
//! effects), the player behavior controller, enemy AI state machines,
//! and short-lived entities (projectiles, pickups). Rendering,
//! animation playback, audio, scene loading, raw input polling and the
//! actual collision detection live in external collaborators: the core
//! consumes overlap/collision events and emits fire-and-forget
//! presentation signals.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use platformer_core::prelude::*;
//!
//! let config = GameConfig::default().validated();
//! let mut world = GameWorld::new(config);
//! world.start_game();
//! world.start_level(Vec2::new(0.0, 0.0));
//!
//! loop {
//!     let input = PlayerInput::default();
//!     // feed contacts reported by the physics collaborator, then step
//!     let _events = world.tick(&input);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod coordinator;
pub mod entities;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod timer;
pub mod world;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{ConfigError, GameConfig},
        coordinator::{GameCoordinator, GameState},
        entities::{
            enemy::{AiState, DamageKind, Enemy},
            pickup::{Pickup, PickupKind},
            player::{CombatState, Player, PlayerInput},
            projectile::{Projectile, ProjectileOwner, ProjectilePhase, ProjectileSpawn},
            EnemyKey, PickupKey, ProjectileKey,
        },
        events::{AnimSignal, AnimTarget, EventBus, EventHandler, GameEvent, Scene, SubscriberId},
        foundation::{
            math::Vec2,
            time::TickClock,
        },
        physics::{Body, BodyKind, Contact, ContactBody, Tag},
        timer::{TimerKey, TimerOwner, TimerPurpose, TimerScheduler},
        world::GameWorld,
    };
}
