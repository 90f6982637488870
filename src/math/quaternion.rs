//! Unit quaternions for composing rotations.
//!
//! Used by the camera (yaw about world Y combined with pitch about the
//! local right axis) and by mesh spin. Converted to a [`Mat4`] before
//! being applied to basis vectors.

use std::ops::Mul;

use super::mat4::Mat4;
use super::vec3::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Rotation of `angle` radians around `axis`. The axis is normalized
    /// here so callers can pass raw basis columns.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize();
        let half = angle * 0.5;
        let s = half.sin();
        Self {
            w: half.cos(),
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
        }
    }

    pub fn magnitude(&self) -> f32 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let m = self.magnitude();
        Self {
            w: self.w / m,
            x: self.x / m,
            y: self.y / m,
            z: self.z / m,
        }
    }

    /// Expands the rotation into a 4x4 matrix (column-vector convention).
    pub fn to_mat4(&self) -> Mat4 {
        let Self { w, x, y, z } = self.normalize();

        Mat4::new([
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
                0.0,
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
                0.0,
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

/// Hamilton product. `(a * b)` applies rotation `b` first, then `a`.
impl Mul<Quaternion> for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Self::Output {
        Quaternion {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn quarter_turn_about_y_maps_x_to_minus_z() {
        let q = Quaternion::from_axis_angle(Vec3::UP, std::f32::consts::FRAC_PI_2);
        let v = q.to_mat4() * Vec4::direction(1.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn matches_matrix_rotation() {
        let q = Quaternion::from_axis_angle(Vec3::UP, 0.7);
        let m = Mat4::rotation_y(0.7);
        let qm = q.to_mat4();
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(qm.get(row, col), m.get(row, col), epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn product_composes_rotations() {
        let a = Quaternion::from_axis_angle(Vec3::UP, 0.3);
        let b = Quaternion::from_axis_angle(Vec3::UP, 0.5);
        let ab = (a * b).to_mat4();
        let m = Mat4::rotation_y(0.8);
        assert_relative_eq!(ab.get(0, 0), m.get(0, 0), epsilon = 1e-6);
        assert_relative_eq!(ab.get(0, 2), m.get(0, 2), epsilon = 1e-6);
    }
}
