use glam::Vec2;

/// Radians of camera rotation per pixel of pointer motion.
pub const MOUSE_SENSITIVITY: f32 = 0.001;

/// Pointer-lock flag plus the relative motion gathered since the last tick.
///
/// Motion is only recorded while the pointer is locked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerLook {
    locked: bool,
    pending: Vec2,
}

impl PointerLook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Flips the lock state and returns the new value.
    pub fn toggle_lock(&mut self) -> bool {
        self.set_locked(!self.locked);
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if !locked {
            self.pending = Vec2::ZERO;
        }
    }

    pub fn accumulate(&mut self, delta: Vec2) {
        if self.locked && delta.is_finite() {
            self.pending += delta;
        }
    }

    pub fn take_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_is_ignored_until_locked() {
        let mut pointer = PointerLook::new();
        pointer.accumulate(Vec2::new(5.0, 5.0));
        assert_eq!(pointer.take_delta(), Vec2::ZERO);

        assert!(pointer.toggle_lock());
        pointer.accumulate(Vec2::new(3.0, -1.0));
        pointer.accumulate(Vec2::new(2.0, 4.0));
        assert_eq!(pointer.take_delta(), Vec2::new(5.0, 3.0));
        assert_eq!(pointer.take_delta(), Vec2::ZERO);
    }

    #[test]
    fn unlocking_discards_pending_motion() {
        let mut pointer = PointerLook::new();
        pointer.set_locked(true);
        pointer.accumulate(Vec2::new(10.0, 0.0));
        assert!(!pointer.toggle_lock());
        assert_eq!(pointer.take_delta(), Vec2::ZERO);
    }

    #[test]
    fn non_finite_motion_is_dropped() {
        let mut pointer = PointerLook::new();
        pointer.set_locked(true);
        pointer.accumulate(Vec2::new(f32::NAN, 1.0));
        assert_eq!(pointer.take_delta(), Vec2::ZERO);
    }
}
