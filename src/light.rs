//! Lighting types for the shading stage.

use crate::math::{Color, Vec3};

/// A directional light: parallel rays from a fixed direction.
pub struct DirectionalLight {
    pub color: Color,
    /// Normalized direction the light travels (not where it comes from).
    pub direction: Vec3,
    pub intensity: f32,
}

/// The single scene light used by the Phong shader. No ambient term.
pub const SUN: DirectionalLight = DirectionalLight {
    color: Color::new(1.0, 1.0, 1.0),
    direction: Vec3::new(0.577, -0.577, -0.577),
    intensity: 5.0,
};
