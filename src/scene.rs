use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};

use crate::matrix::{self, Matrix4};

/// Euler angles in radians. Roll is stored but never applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Position and orientation of the camera or a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Rotation,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Rotation::default(),
        }
    }
}

/// Mutable per-frame state: one camera and one placed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneState {
    pub camera: Transform,
    pub object: Transform,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            camera: Transform::at(Vec3::new(0.0, 0.0, 5.0)),
            // centers the unit cube on the origin
            object: Transform::at(Vec3::splat(-0.5)),
        }
    }
}

impl SceneState {
    /// Turns the camera by a pointer delta in pixels.
    ///
    /// Moving right turns right and moving down looks down. Pitch is clamped
    /// to `[-π/2, π/2]` and yaw wrapped into `[0, 2π)`.
    pub fn look(&mut self, delta: Vec2, sensitivity: f32) {
        let rotation = &mut self.camera.rotation;
        rotation.yaw = wrap_angle(rotation.yaw - delta.x * sensitivity);
        rotation.pitch = (rotation.pitch - delta.y * sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// World-to-camera matrix: undo the camera translation, then yaw, then pitch.
    pub fn view_matrix(&self) -> Matrix4 {
        let Transform { position, rotation } = self.camera;
        matrix::rotate_x(-rotation.pitch)
            * matrix::rotate_y(-rotation.yaw)
            * matrix::translate(-position.x, -position.y, -position.z)
    }

    pub fn model_matrix(&self) -> Matrix4 {
        let Transform { position, rotation } = self.object;
        matrix::translate(position.x, position.y, position.z)
            * matrix::rotate_y(rotation.yaw)
            * matrix::rotate_x(rotation.pitch)
    }

    /// Unit vector the camera looks along (yaw 0, pitch 0 faces -Z).
    pub fn camera_forward(&self) -> Vec3 {
        let Rotation { pitch, yaw, .. } = self.camera.rotation;
        Vec3::new(
            -yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
    }
}

/// Perspective parameters for the projection uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_2,
            aspect_ratio: 16.0 / 9.0,
            z_near: 1.0,
            z_far: 100.0,
        }
    }
}

impl Lens {
    pub fn projection(&self) -> Matrix4 {
        matrix::perspective_projection(self.fov_y, self.aspect_ratio, self.z_near, self.z_far)
    }
}

fn wrap_angle(radians: f32) -> f32 {
    let wrapped = radians.rem_euclid(TAU);
    // rem_euclid can round tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
