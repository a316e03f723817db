//! Foundation utilities
//!
//! Math, time, and logging support shared by the whole simulation core.

pub mod logging;
pub mod math;
pub mod time;
