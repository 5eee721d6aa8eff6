//! The physics seam the controller drives: ray queries, force application and
//! the body transform.

use nalgebra::Vector3;
use serde::Serialize;

/// How a force vector is applied to the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Continuous force, integrated over the next physics step.
    Force,
    /// Instantaneous impulse; the velocity change depends on mass.
    Impulse,
    /// Instantaneous velocity change, independent of mass.
    VelocityChange,
}

/// Errors raised by physics queries against the character body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    #[error("character body is missing from the physics world")]
    MissingBody,
    #[error("character collider is missing from the physics world")]
    MissingCollider,
    #[error("ray direction must be non-zero")]
    DegenerateRay,
}

/// Horizontal look basis of the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            forward: Vector3::z(),
            right: Vector3::x(),
        }
    }
}

impl Orientation {
    /// Basis for a yaw angle in radians, rotating +Z towards +X.
    pub fn from_yaw(yaw: f32) -> Self {
        let (sin, cos) = yaw.sin_cos();
        Self {
            forward: Vector3::new(sin, 0.0, cos),
            right: Vector3::new(cos, 0.0, -sin),
        }
    }
}

/// Everything the locomotion controller needs from the physics engine and
/// the body transform.
pub trait CharacterBody {
    /// Casts a ray that ignores the character itself. `Ok(true)` on any hit.
    fn cast_ray(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Result<bool, PhysicsError>;

    fn apply_force(&mut self, force: Vector3<f32>, mode: ForceMode);

    fn linear_velocity(&self) -> Vector3<f32>;

    fn set_linear_velocity(&mut self, velocity: Vector3<f32>);

    fn set_drag(&mut self, drag: f32);

    /// Ambient world gravity.
    fn gravity(&self) -> Vector3<f32>;

    fn mass(&self) -> f32;

    /// World position of the body origin (its center).
    fn position(&self) -> Vector3<f32>;

    fn orientation(&self) -> Orientation;

    /// Pushes a new local scale to the body collider.
    fn set_local_scale(&mut self, scale: Vector3<f32>);
}

/// Collider scale and camera rig offset. Written only by the active
/// geometry transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyGeometry {
    pub scale: Vector3<f32>,
    pub camera_offset: Vector3<f32>,
}

impl BodyGeometry {
    pub fn new(scale: Vector3<f32>, camera_offset: Vector3<f32>) -> Self {
        Self {
            scale,
            camera_offset,
        }
    }

    /// Component-wise linear interpolation towards `target`.
    pub fn lerp(&self, target: &BodyGeometry, t: f32) -> BodyGeometry {
        let t = t.clamp(0.0, 1.0);
        BodyGeometry {
            scale: self.scale.lerp(&target.scale, t),
            camera_offset: self.camera_offset.lerp(&target.camera_offset, t),
        }
    }
}
