//! Math primitives for the rasterizer.
//!
//! Plain `f32` value types: vectors, a 4x4 matrix, quaternions, and an RGBA
//! color, plus the small scalar helpers the pipeline needs.

pub mod color;
pub mod mat4;
pub mod quaternion;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use color::Color;
pub use mat4::Mat4;
pub use quaternion::Quaternion;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;

/// Remap `value` from the range [from, to] to [0, 1].
///
/// Values outside the source range extrapolate; callers clamp when they
/// need a bounded result.
#[inline]
pub fn remap(value: f32, from: f32, to: f32) -> f32 {
    (value - from) / (to - from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn remap_endpoints() {
        assert_relative_eq!(remap(0.975, 0.975, 1.0), 0.0);
        assert_relative_eq!(remap(1.0, 0.975, 1.0), 1.0);
    }

    #[test]
    fn remap_extrapolates_below_range() {
        assert!(remap(0.5, 0.975, 1.0) < 0.0);
    }
}
