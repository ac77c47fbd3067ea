//! Sample component definitions for the ECS demos.
//!
//! Components are plain data: anything `'static` with a stable
//! [`Component::type_name`] qualifies. Deriving `Serialize`/`Deserialize` is
//! only needed for kinds that are saved in scene files.

use engine_component::Component;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Position, Euler rotation (radians, XYZ) and scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// The 4×4 model matrix.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        let rotation = glam::Quat::from_euler(
            glam::EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {
    fn type_name() -> &'static str {
        "Transform"
    }
}

/// A 3D velocity component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Velocity {
    /// Linear velocity in world units per second.
    pub linear: Vec3,
}

impl Velocity {
    /// Zero velocity.
    pub const ZERO: Self = Self { linear: Vec3::ZERO };

    /// Create a new velocity.
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            linear: Vec3::new(x, y, z),
        }
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Component for Velocity {
    fn type_name() -> &'static str {
        "Velocity"
    }
}

/// An orbiting camera looking at `target` from `distance` away.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Camera {
    pub active: bool,
    pub target: Vec3,
    pub distance: f32,
    /// Horizontal angle in radians.
    pub yaw: f32,
    /// Vertical angle in radians, kept within `min_pitch..=max_pitch`.
    pub pitch: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub auto_rotate: bool,
    /// Yaw change per second while `auto_rotate` is set.
    pub auto_rotate_speed: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Camera {
    /// World-space eye position for the current angles.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let pitch = self.pitch.clamp(self.min_pitch, self.max_pitch);
        self.target
            + self.distance
                * Vec3::new(
                    pitch.cos() * self.yaw.sin(),
                    pitch.sin(),
                    pitch.cos() * self.yaw.cos(),
                )
    }

    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    #[must_use]
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            aspect_ratio,
            self.near_plane,
            self.far_plane,
        )
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            active: true,
            target: Vec3::ZERO,
            distance: 5.0,
            yaw: 0.0,
            pitch: 0.0,
            min_pitch: -1.5,
            max_pitch: 1.5,
            auto_rotate: false,
            auto_rotate_speed: 0.5,
            fov: 45.0,
            near_plane: 0.1,
            far_plane: 100.0,
        }
    }
}

impl Component for Camera {
    fn type_name() -> &'static str {
        "Camera"
    }
}

/// A simple name tag component for debugging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Name {
    /// The entity's display name.
    pub value: String,
}

impl Name {
    /// Create a new name component.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { value: name.into() }
    }
}

impl Component for Name {
    fn type_name() -> &'static str {
        "Name"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_serialization() {
        let v = Velocity::new(1.0, 2.0, 3.0);
        let bytes = rmp_serde::to_vec(&v).unwrap();
        let restored: Velocity = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(v, restored);
    }

    #[test]
    fn test_camera_eye_orbits_target() {
        let mut camera = Camera {
            target: Vec3::new(1.0, 0.0, 0.0),
            distance: 2.0,
            ..Camera::default()
        };
        assert!((camera.eye() - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-5);

        camera.yaw = std::f32::consts::FRAC_PI_2;
        assert!((camera.eye() - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
        assert!((camera.eye() - camera.target).length() - 2.0 < 1e-5);
    }

    #[test]
    fn test_camera_pitch_is_clamped() {
        let camera = Camera {
            pitch: 10.0,
            max_pitch: 0.5,
            ..Camera::default()
        };
        let eye = camera.eye();
        assert!((eye.y - 5.0 * 0.5f32.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_partial_camera_json_uses_defaults() {
        let camera: Camera = serde_json::from_str(r#"{ "distance": 9.0 }"#).unwrap();
        assert_eq!(camera.distance, 9.0);
        assert_eq!(camera.fov, 45.0);
        assert!(camera.active);
    }

    #[test]
    fn test_transform_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.to_matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_name_component() {
        let name = Name::new("Player");
        let bytes = rmp_serde::to_vec(&name).unwrap();
        let restored: Name = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(name, restored);
    }
}
