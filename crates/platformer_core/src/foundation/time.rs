//! Time management utilities
//!
//! The simulation advances on a fixed-rate tick; every timed effect in
//! the core reads this clock and never the wall clock, which keeps the
//! whole simulation deterministic and testable.

/// Fixed-rate simulation clock
#[derive(Debug, Clone)]
pub struct TickClock {
    timestep: f32,
    now: f32,
    tick_count: u64,
}

impl TickClock {
    /// Create a clock advancing by `timestep` seconds per tick
    pub fn new(timestep: f32) -> Self {
        Self {
            timestep: if timestep > 0.0 { timestep } else { 1.0 / 60.0 },
            now: 0.0,
            tick_count: 0,
        }
    }

    /// Advance the clock by one tick
    pub fn advance(&mut self) {
        self.now += self.timestep;
        self.tick_count += 1;
    }

    /// Current simulation time in seconds
    pub fn now(&self) -> f32 {
        self.now
    }

    /// Seconds elapsed per tick
    pub fn dt(&self) -> f32 {
        self.timestep
    }

    /// Number of ticks advanced so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
