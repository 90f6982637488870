//! Perspective camera with an orthonormal-basis world transform.
//!
//! The camera stores its pose as a basis matrix whose columns are right,
//! up, forward, and origin. The view matrix is the basis inverse; the
//! projection depends on aspect ratio, the stored half-FOV tangent, the
//! near/far planes, and the active handedness. Switching handedness
//! conjugates the basis with diag(1, 1, -1, 1) and rebuilds the
//! projection, so toggling twice restores the camera exactly.

use crate::math::{Mat4, Quaternion, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    RightHanded,
    LeftHanded,
}

/// Bounds the zoom control clamps the stored half-FOV tangent to.
const FOV_TAN_MIN: f32 = 5.0 * std::f32::consts::PI / 180.0;
const FOV_TAN_MAX: f32 = std::f32::consts::PI;

pub struct Camera {
    basis: Mat4,
    projection: Mat4,
    aspect_ratio: f32,
    /// tan(half vertical FOV).
    fov_tan: f32,
    near: f32,
    far: f32,
    handedness: Handedness,
    /// +1 right-handed, -1 left-handed; scales z-axis inputs.
    orientation: f32,
}

impl Camera {
    /// Creates a right-handed camera at `position` looking along
    /// `forward` (normalized by the caller).
    pub fn new(
        position: Vec3,
        forward: Vec3,
        aspect_ratio: f32,
        fov_deg: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let orientation = 1.0;
        let cam_forward = Vec3::new(forward.x * orientation, forward.y * orientation, forward.z);
        let right = Vec3::UP.cross(cam_forward).normalize();
        let up = cam_forward.cross(right);

        let basis = Mat4::from_columns(
            Vec4::from_vec3(right, 0.0),
            Vec4::from_vec3(up, 0.0),
            Vec4::from_vec3(cam_forward, 0.0),
            Vec4::point(position.x, position.y, position.z * orientation),
        );

        let mut camera = Self {
            basis,
            projection: Mat4::identity(),
            aspect_ratio,
            fov_tan: (fov_deg.to_radians() / 2.0).tan(),
            near,
            far,
            handedness: Handedness::RightHanded,
            orientation,
        };
        camera.rebuild_projection();
        camera
    }

    pub fn basis(&self) -> &Mat4 {
        &self.basis
    }

    /// View matrix: the inverse of the basis. Falls back to identity for
    /// a degenerate basis rather than failing the frame.
    pub fn view_matrix(&self) -> Mat4 {
        self.basis.inverse().unwrap_or(Mat4::identity())
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// World-space position: the basis origin column.
    pub fn position(&self) -> Vec3 {
        self.basis.column(3).to_vec3()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// The stored tan(half-FOV).
    pub fn fov(&self) -> f32 {
        self.fov_tan
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// +1 for right-handed, -1 for left-handed. Input mapping scales
    /// z-axis motion by this.
    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.rebuild_projection();
    }

    /// Translate along the camera's local axes.
    pub fn translate(&mut self, offset: Vec3) {
        self.basis = self.basis * Mat4::translation(offset.x, offset.y, offset.z);
    }

    /// Rotate the basis by `pitch` radians about world Y composed with
    /// `roll` radians about the camera's current right axis. The origin
    /// column is untouched, so the basis stays orthonormal in place.
    pub fn rotate(&mut self, roll: f32, pitch: f32) {
        let right = self.basis.column(0).to_vec3();
        let rotation =
            (Quaternion::from_axis_angle(Vec3::UP, pitch) * Quaternion::from_axis_angle(right, roll))
                .to_mat4();

        for col in 0..3 {
            self.basis.set_column(col, rotation * self.basis.column(col));
        }
    }

    /// Adjust the stored half-FOV tangent, clamped to the control bounds.
    pub fn zoom(&mut self, offset: f32) {
        self.fov_tan = (self.fov_tan + offset).clamp(FOV_TAN_MIN, FOV_TAN_MAX);
        self.rebuild_projection();
    }

    /// Switch between right- and left-handed projection.
    ///
    /// The basis is conjugated with the z-flip matrix diag(1, 1, -1, 1)
    /// on both sides; applying the switch twice restores the camera
    /// element-wise.
    pub fn set_handedness(&mut self, handedness: Handedness) {
        if handedness == self.handedness {
            return;
        }

        self.handedness = handedness;
        self.orientation = -self.orientation;

        let flip = Mat4::scaling(1.0, 1.0, -1.0);
        self.basis = flip * self.basis * flip;

        self.rebuild_projection();
    }

    fn rebuild_projection(&mut self) {
        let (near, far) = (self.near, self.far);
        let x = 1.0 / (self.aspect_ratio * self.fov_tan);
        let y = 1.0 / self.fov_tan;

        self.projection = match self.handedness {
            Handedness::RightHanded => Mat4::new([
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, far / (near - far), (far * near) / (near - far)],
                [0.0, 0.0, -1.0, 0.0],
            ]),
            Handedness::LeftHanded => Mat4::new([
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, far / (far - near), -(far * near) / (far - near)],
                [0.0, 0.0, 1.0, 0.0],
            ]),
        };
    }
}

// =============================================================================
// Camera Controller
// =============================================================================

/// Maps the host's per-frame input snapshot onto camera motions.
///
/// Mouse combos follow the original control scheme: both buttons pan,
/// left button walks and yaws, right button looks around. WASD moves in
/// the ground plane while a button is held. Yaw and z-axis motion are
/// scaled by the camera orientation so controls feel the same in either
/// handedness.
pub struct CameraController {
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Look sensitivity in degrees per mouse pixel.
    pub look_sensitivity: f32,
    /// Zoom speed applied to the half-FOV tangent per second.
    pub zoom_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 50.0,
            look_sensitivity: 0.3,
            zoom_sensitivity: 1.0,
        }
    }
}

impl CameraController {
    pub fn update(
        &self,
        camera: &mut Camera,
        input: &crate::window::InputState,
        delta_time: f32,
    ) {
        let mut offset = Vec3::ZERO;
        let mut roll = 0.0f32;
        let mut pitch = 0.0f32;

        if input.zoom != 0.0 {
            camera.zoom(input.zoom * self.zoom_sensitivity * delta_time);
        }

        if input.mouse_left || input.mouse_right {
            let (dx, dy) = input.mouse_delta;
            if dx != 0 || dy != 0 {
                let angle = (dy as f32).atan2(dx as f32);
                if input.mouse_left && input.mouse_right {
                    offset.x += angle.cos() * self.move_speed;
                    offset.y -= angle.sin() * self.move_speed;
                } else if input.mouse_left {
                    offset.z += angle.sin() * self.move_speed;
                    pitch -= dx as f32;
                } else {
                    roll -= dy as f32;
                    pitch -= dx as f32;
                }
            }

            if input.move_x != 0.0 || input.move_y != 0.0 {
                let angle = input.move_y.atan2(input.move_x);
                offset.x += angle.cos() * self.move_speed;
                offset.z -= angle.sin() * self.move_speed;
            }
        }

        let orientation = camera.orientation();
        if roll != 0.0 || pitch != 0.0 {
            camera.rotate(
                (roll * orientation * self.look_sensitivity).to_radians(),
                (pitch * orientation * self.look_sensitivity).to_radians(),
            );
        }

        if offset != Vec3::ZERO {
            let mut offset = offset * delta_time;
            offset.z *= orientation;
            camera.translate(offset);
        }
    }
}
