//! Derived eye-tracking output structures.

use super::math::Quat;

/// Output for a single eye, or the combined pseudo-eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeState {
    /// Gaze direction as a rotation from straight-ahead.
    pub gaze: Quat,
    /// Eyelid openness, `0.0` closed to `1.0` open.
    pub openness: f32,
    /// Eye-widen amount.
    pub widen: f32,
    /// Eye-squeeze amount.
    pub squeeze: f32,
    /// Inner brow vertical offset (raise minus lowerer component).
    pub inner_brow_vertical: f32,
    /// Outer brow vertical offset (raise minus lowerer component).
    pub outer_brow_vertical: f32,
    /// Whether this eye is being tracked right now.
    pub is_tracking: bool,
}

impl EyeState {
    /// Whether the gaze rotation is usable. NaN raw input flows through the
    /// gaze math and lands here as an invalid rotation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.gaze.is_finite()
    }
}

impl Default for EyeState {
    fn default() -> Self {
        Self {
            gaze: Quat::IDENTITY,
            openness: 0.0,
            widen: 0.0,
            squeeze: 0.0,
            inner_brow_vertical: 0.0,
            outer_brow_vertical: 0.0,
            is_tracking: false,
        }
    }
}

/// Aggregate eye output handed to the host each tick.
///
/// `combined` is derived, never written from the network; it carries gaze and
/// eyelid only, with a sticky last-valid gaze when both eyes drop out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Eyes {
    /// Left eye.
    pub left: EyeState,
    /// Right eye.
    pub right: EyeState,
    /// Combined pseudo-eye.
    pub combined: EyeState,
    /// Whether the eye branch produced output this tick. When false the
    /// remaining fields hold their previous values; consumers must check
    /// this flag rather than assume zeroed geometry.
    pub is_eye_tracking_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_is_identity_and_untracked() {
        let eye = EyeState::default();
        assert_eq!(eye.gaze, Quat::IDENTITY);
        assert!(!eye.is_tracking);
        assert!(eye.is_valid());
    }

    #[test]
    fn nan_gaze_is_invalid() {
        let eye = EyeState {
            gaze: Quat {
                w: f32::NAN,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            ..EyeState::default()
        };
        assert!(!eye.is_valid());
    }
}
