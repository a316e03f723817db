//! Math utilities and types
//!
//! Thin aliases over nalgebra for 2D gameplay math.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Distance between two points
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).norm()
}

/// Horizontal facing sign of a value: -1.0, 0.0 or +1.0
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
