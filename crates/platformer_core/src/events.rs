//! Outbound notifications
//!
//! Fire-and-forget signals the core emits for presentation, UI and
//! scene-loading collaborators. Events are queued during a tick and
//! dispatched in one batch at the end of it; the core never waits on
//! or reads results from an observer. Observers register explicitly
//! and can be removed safely at any time.

use crate::coordinator::GameState;
use crate::entities::{EnemyKey, PickupKey, ProjectileKey};

/// Named level a scene-loading collaborator should switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Title menu scene
    TitleMenu,
    /// Gameplay scene
    GameScene,
    /// Game-over menu scene
    GameOverMenu,
}

/// Which entity a presentation signal refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimTarget {
    /// The player character
    Player,
    /// An enemy entity
    Enemy(EnemyKey),
    /// A projectile entity
    Projectile(ProjectileKey),
    /// A pickup entity
    Pickup(PickupKey),
}

/// Fire-and-forget presentation signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimSignal {
    /// First jump
    Jump,
    /// Second (air) jump
    DoubleJump,
    /// Melee attack window opened
    AttackStart,
    /// Melee attack window closed
    AttackEnd,
    /// Took a hit
    Impact,
    /// Death sequence started
    Death,
    /// Drowning struggle started
    StruggleInWater,
    /// Patrol direction reversed
    Turn,
    /// Squished by a stomp
    Squish,
    /// Projectile impact effect
    ProjectileImpact,
    /// Pickup collected effect
    PickupGet,
    /// Ranged weapon unlocked
    WeaponUnlocked,
    /// Jump boost activated
    JumpBoost,
}

/// Notification emitted by the gameplay core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Global game state changed
    StateChanged(GameState),
    /// Lives total changed (carries the new value)
    LivesChanged(u32),
    /// Lives strictly decreased
    LifeLost,
    /// Score changed (carries the new value)
    ScoreChanged(i32),
    /// A player entity was created
    PlayerCreated,
    /// A named scene should be loaded
    SceneRequested(Scene),
    /// Presentation signal for one entity
    Anim(AnimTarget, AnimSignal),
}

/// Handle identifying a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Observer of gameplay notifications
pub trait EventHandler {
    /// Receive one dispatched event
    fn on_event(&mut self, event: &GameEvent);
}

/// Buffered broadcast bus for gameplay notifications
///
/// `publish` queues; `dispatch` delivers the whole queue to every
/// registered handler and returns the delivered batch so embedders
/// without handlers can still observe it.
pub struct EventBus {
    queue: Vec<GameEvent>,
    handlers: Vec<(SubscriberId, Box<dyn EventHandler>)>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    /// Register an observer; keep the id to unregister later
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Remove an observer; returns false if it was already gone
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Queue an event for the next dispatch
    pub fn publish(&mut self, event: GameEvent) {
        self.queue.push(event);
    }

    /// Deliver all queued events to every handler, in publish order
    pub fn dispatch(&mut self) -> Vec<GameEvent> {
        let batch = std::mem::take(&mut self.queue);
        for event in &batch {
            for (_, handler) in &mut self.handlers {
                handler.on_event(event);
            }
        }
        batch
    }

    /// Events queued but not yet dispatched
    pub fn pending(&self) -> &[GameEvent] {
        &self.queue
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
