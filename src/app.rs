use glam::Vec2;

use crate::input::{PointerLook, MOUSE_SENSITIVITY};
use crate::render::FrameUniforms;
use crate::scene::{Lens, SceneState};

/// Owns the scene state between frames and turns each tick into uniforms.
#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    scene: SceneState,
    lens: Lens,
    pointer: PointerLook,
    elapsed: f32,
    frames: u64,
}

impl FrameDriver {
    pub fn new(scene: SceneState, lens: Lens) -> Self {
        Self {
            scene,
            lens,
            ..Self::default()
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn lens(&self) -> &Lens {
        &self.lens
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer.is_locked()
    }

    /// Toggles pointer lock and returns the new state.
    pub fn toggle_pointer_lock(&mut self) -> bool {
        self.pointer.toggle_lock()
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer.set_locked(locked);
    }

    /// Records relative pointer motion (pixels) for the next tick.
    pub fn pointer_moved(&mut self, delta: Vec2) {
        self.pointer.accumulate(delta);
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.lens.aspect_ratio = aspect_ratio;
        }
    }

    /// Advances one frame: applies pending look input, accumulates elapsed
    /// time and returns the uniforms for this frame's draw.
    pub fn tick(&mut self, dt: f32) -> FrameUniforms {
        let look = self.pointer.take_delta();
        self.scene.look(look, MOUSE_SENSITIVITY);
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        self.frames += 1;
        FrameUniforms {
            model: self.scene.model_matrix(),
            view: self.scene.view_matrix(),
            projection: self.lens.projection(),
            elapsed_seconds: self.elapsed,
        }
    }
}

/// One-line description of the camera for logs and the headless summary.
pub fn describe_camera(scene: &SceneState) -> String {
    let camera = &scene.camera;
    format!(
        "camera pos=({:.2}, {:.2}, {:.2}) pitch={:.3} yaw={:.3}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.rotation.pitch,
        camera.rotation.yaw
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn tick_accumulates_elapsed_time() {
        let mut driver = FrameDriver::default();
        let first = driver.tick(0.5);
        let second = driver.tick(0.25);
        assert_eq!(first.elapsed_seconds, 0.5);
        assert!((second.elapsed_seconds - 0.75).abs() < 1e-6);
        assert_eq!(second.time().seconds, second.elapsed_seconds);
        assert_eq!(driver.frame_count(), 2);
    }

    #[test]
    fn tick_ignores_bogus_durations() {
        let mut driver = FrameDriver::default();
        driver.tick(-1.0);
        driver.tick(f32::NAN);
        assert_eq!(driver.elapsed(), 0.0);
    }

    #[test]
    fn look_applies_only_while_locked() {
        let mut driver = FrameDriver::default();
        driver.pointer_moved(Vec2::new(0.0, -500.0));
        driver.tick(0.016);
        assert_eq!(driver.scene().camera.rotation.pitch, 0.0);

        assert!(driver.toggle_pointer_lock());
        driver.pointer_moved(Vec2::new(0.0, -500.0));
        driver.tick(0.016);
        assert!((driver.scene().camera.rotation.pitch - 0.5).abs() < 1e-6);

        // the delta is consumed by the tick that applied it
        driver.tick(0.016);
        assert!((driver.scene().camera.rotation.pitch - 0.5).abs() < 1e-6);
    }

    #[test]
    fn large_motion_clamps_pitch() {
        let mut driver = FrameDriver::default();
        driver.set_pointer_locked(true);
        for _ in 0..10 {
            driver.pointer_moved(Vec2::new(0.0, -1.0e6));
            driver.tick(0.016);
        }
        assert_eq!(driver.scene().camera.rotation.pitch, FRAC_PI_2);
    }

    #[test]
    fn uniforms_follow_scene() {
        let mut driver = FrameDriver::default();
        let uniforms = driver.tick(0.0);
        assert_eq!(uniforms.view, driver.scene().view_matrix());
        assert_eq!(uniforms.model, driver.scene().model_matrix());
        assert_eq!(uniforms.projection, driver.lens().projection());
    }

    #[test]
    fn aspect_ratio_rejects_degenerate_values() {
        let mut driver = FrameDriver::default();
        driver.set_aspect_ratio(0.0);
        driver.set_aspect_ratio(f32::INFINITY);
        assert_eq!(driver.lens().aspect_ratio, 16.0 / 9.0);
        driver.set_aspect_ratio(2.0);
        assert_eq!(driver.lens().aspect_ratio, 2.0);
    }

    #[test]
    fn describes_default_camera() {
        let text = describe_camera(&SceneState::default());
        assert_eq!(text, "camera pos=(0.00, 0.00, 5.00) pitch=0.000 yaw=0.000");
    }
}
