//! Per-tick conversion from raw parameters to anatomical output.

use std::time::Instant;

use crate::protocol::{ConnectionConfig, Parameter, ParameterStore};

use super::eyes::{EyeState, Eyes};
use super::math::{Quat, Vec3};
use super::mouth::MouthState;

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Converts the raw parameter store into eye and mouth output once per host
/// tick.
///
/// Owns the sticky combined-gaze state: the combined eye never snaps to an
/// undefined orientation, it holds the last valid value (seeded at identity)
/// until a valid input returns.
#[derive(Debug, Default)]
pub struct Deriver {
    eyes: Eyes,
    mouth: MouthState,
    last_valid_combined: Quat,
}

impl Deriver {
    /// Fresh deriver with identity gaze and all tracking flags off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest derived eye output.
    #[must_use]
    pub fn eyes(&self) -> &Eyes {
        &self.eyes
    }

    /// Latest derived mouth output.
    #[must_use]
    pub fn mouth(&self) -> &MouthState {
        &self.mouth
    }

    /// Run one update tick against the store.
    ///
    /// `_delta` is the host frame time, currently unused and reserved for
    /// future smoothing. Each branch runs only when enabled and fresh; an
    /// inactive branch clears its tracking flags and leaves the previously
    /// derived values untouched.
    pub fn update(&mut self, store: &ParameterStore, config: &ConnectionConfig, _delta: f32) {
        let now = Instant::now();

        if config.eye_tracking && store.is_eye_fresh(now, config.stale_after) {
            self.update_eyes(store, config);
        } else {
            self.eyes.is_eye_tracking_active = false;
            self.eyes.left.is_tracking = false;
            self.eyes.right.is_tracking = false;
            self.eyes.combined.is_tracking = false;
        }

        if config.face_tracking && store.is_face_fresh(now, config.stale_after) {
            self.update_mouth(store);
        } else {
            self.mouth.is_tracking = false;
            self.mouth.is_device_active = false;
        }
    }

    fn update_eyes(&mut self, store: &ParameterStore, config: &ConnectionConfig) {
        let get = |parameter| store.get(parameter);
        // Reversal flags apply to gaze direction only, never to eyelid or
        // brow channels.
        let sign_x = if config.reverse_x { -1.0 } else { 1.0 };
        let sign_y = if config.reverse_y { -1.0 } else { 1.0 };

        self.eyes.is_eye_tracking_active = true;
        self.eyes.left.is_tracking = true;
        self.eyes.right.is_tracking = true;

        self.eyes.left.gaze = Quat::from_gaze(
            sign_x * get(Parameter::EyeLeftX),
            sign_y * get(Parameter::EyeLeftY),
        );
        self.eyes.right.gaze = Quat::from_gaze(
            sign_x * get(Parameter::EyeRightX),
            sign_y * get(Parameter::EyeRightY),
        );

        self.eyes.left.openness = get(Parameter::EyeOpenLeft);
        self.eyes.right.openness = get(Parameter::EyeOpenRight);
        self.eyes.left.widen = get(Parameter::EyeWideLeft);
        self.eyes.right.widen = get(Parameter::EyeWideRight);
        self.eyes.left.squeeze = get(Parameter::EyeSquintLeft);
        self.eyes.right.squeeze = get(Parameter::EyeSquintRight);

        let left_brow_lowerer =
            get(Parameter::BrowPinchLeft) - get(Parameter::BrowLowererLeft);
        self.eyes.left.inner_brow_vertical =
            get(Parameter::BrowInnerUpLeft) - left_brow_lowerer;
        self.eyes.left.outer_brow_vertical =
            get(Parameter::BrowOuterUpLeft) - left_brow_lowerer;

        let right_brow_lowerer =
            get(Parameter::BrowPinchRight) - get(Parameter::BrowLowererRight);
        self.eyes.right.inner_brow_vertical =
            get(Parameter::BrowInnerUpRight) - right_brow_lowerer;
        self.eyes.right.outer_brow_vertical =
            get(Parameter::BrowOuterUpRight) - right_brow_lowerer;

        self.eyes.combined = EyeState {
            gaze: self.combined_gaze(),
            openness: self.eyes.left.openness.max(self.eyes.right.openness),
            is_tracking: true,
            ..self.eyes.combined
        };
    }

    /// Combined gaze priority chain: both eyes, then left, then right, then
    /// the previous tick's value.
    fn combined_gaze(&mut self) -> Quat {
        let left = self.eyes.left;
        let right = self.eyes.right;
        if left.is_valid() && right.is_valid() && left.is_tracking && right.is_tracking {
            self.last_valid_combined = Quat::slerp(left.gaze, right.gaze, 0.5);
        } else if left.is_valid() && left.is_tracking {
            self.last_valid_combined = left.gaze;
        } else if right.is_valid() && right.is_tracking {
            self.last_valid_combined = right.gaze;
        }
        self.last_valid_combined
    }

    fn update_mouth(&mut self, store: &ParameterStore) {
        let get = |parameter| store.get(parameter);
        let mouth = &mut self.mouth;

        mouth.is_tracking = true;
        mouth.is_device_active = true;

        mouth.mouth_left_smile_frown =
            get(Parameter::MouthSmileLeft) - get(Parameter::MouthFrownLeft);
        mouth.mouth_right_smile_frown =
            get(Parameter::MouthSmileRight) - get(Parameter::MouthFrownRight);
        mouth.mouth_left_dimple = get(Parameter::MouthDimpleLeft);
        mouth.mouth_right_dimple = get(Parameter::MouthDimpleRight);
        mouth.cheek_left_puff_suck = get(Parameter::CheekPuffSuckLeft);
        mouth.cheek_right_puff_suck = get(Parameter::CheekPuffSuckRight);
        mouth.cheek_left_raise = get(Parameter::CheekSquintLeft);
        mouth.cheek_right_raise = get(Parameter::CheekSquintRight);
        mouth.lip_upper_left_raise = get(Parameter::MouthUpperUpLeft);
        mouth.lip_upper_right_raise = get(Parameter::MouthUpperUpRight);
        mouth.lip_lower_left_raise = get(Parameter::MouthLowerDownLeft);
        mouth.lip_lower_right_raise = get(Parameter::MouthLowerDownRight);
        mouth.mouth_pout_left =
            get(Parameter::LipPuckerUpperLeft) - get(Parameter::LipPuckerLowerLeft);
        mouth.mouth_pout_right =
            get(Parameter::LipPuckerUpperRight) - get(Parameter::LipPuckerLowerRight);
        mouth.lip_upper_horizontal = get(Parameter::MouthUpperX);
        mouth.lip_lower_horizontal = get(Parameter::MouthLowerX);
        mouth.lip_top_left_overturn = get(Parameter::LipFunnelUpperLeft);
        mouth.lip_top_right_overturn = get(Parameter::LipFunnelUpperRight);
        mouth.lip_bottom_left_overturn = get(Parameter::LipFunnelLowerLeft);
        mouth.lip_bottom_right_overturn = get(Parameter::LipFunnelLowerRight);
        mouth.lip_top_left_over_under = -get(Parameter::LipSuckUpperLeft);
        mouth.lip_top_right_over_under = -get(Parameter::LipSuckUpperRight);
        mouth.lip_bottom_left_over_under = -get(Parameter::LipSuckLowerLeft);
        mouth.lip_bottom_right_over_under = -get(Parameter::LipSuckLowerRight);
        mouth.lip_left_stretch_tighten =
            get(Parameter::MouthStretchLeft) - get(Parameter::MouthTightenerLeft);
        mouth.lip_right_stretch_tighten =
            get(Parameter::MouthStretchRight) - get(Parameter::MouthTightenerRight);
        mouth.lips_left_press = get(Parameter::MouthPressLeft);
        mouth.lips_right_press = get(Parameter::MouthPressRight);
        mouth.jaw = Vec3::new(
            get(Parameter::JawRight) - get(Parameter::JawLeft),
            -get(Parameter::MouthClosed),
            get(Parameter::JawForward),
        );
        mouth.jaw_open = clamp01(get(Parameter::JawOpen) - get(Parameter::MouthClosed));
        mouth.tongue = Vec3::new(
            get(Parameter::TongueX),
            get(Parameter::TongueY),
            get(Parameter::TongueOut),
        );
        mouth.tongue_roll = get(Parameter::TongueRoll);
        mouth.nose_wrinkle_left = get(Parameter::NoseSneerLeft);
        mouth.nose_wrinkle_right = get(Parameter::NoseSneerRight);
        mouth.chin_raise_bottom = get(Parameter::MouthRaiserLower);
        mouth.chin_raise_top = get(Parameter::MouthRaiserUpper);
    }
}
