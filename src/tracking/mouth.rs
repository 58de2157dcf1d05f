//! Derived mouth/jaw/tongue output structure.

use super::math::Vec3;

/// Blend-shape-style mouth output, one field per host-facing channel.
///
/// Values are fixed arithmetic combinations of the raw parameters; signed
/// fields are differences of paired left/right or upper/lower channels.
/// When the face branch is inactive only the two flags change; field values
/// keep their last derived state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouthState {
    /// Jaw offset: X = right minus left, Y = negated mouth-closed, Z = forward.
    pub jaw: Vec3,
    /// Jaw openness, clamped to `[0, 1]` after subtracting mouth-closed.
    pub jaw_open: f32,
    /// Tongue position: X/Y steer, Z = out.
    pub tongue: Vec3,
    /// Tongue roll.
    pub tongue_roll: f32,
    /// Left smile minus frown.
    pub mouth_left_smile_frown: f32,
    /// Right smile minus frown.
    pub mouth_right_smile_frown: f32,
    /// Left dimple.
    pub mouth_left_dimple: f32,
    /// Right dimple.
    pub mouth_right_dimple: f32,
    /// Left cheek puff/suck.
    pub cheek_left_puff_suck: f32,
    /// Right cheek puff/suck.
    pub cheek_right_puff_suck: f32,
    /// Left cheek raise (squint).
    pub cheek_left_raise: f32,
    /// Right cheek raise (squint).
    pub cheek_right_raise: f32,
    /// Upper-left lip raise.
    pub lip_upper_left_raise: f32,
    /// Upper-right lip raise.
    pub lip_upper_right_raise: f32,
    /// Lower-left lip raise (down movement).
    pub lip_lower_left_raise: f32,
    /// Lower-right lip raise (down movement).
    pub lip_lower_right_raise: f32,
    /// Left pout: upper pucker minus lower pucker.
    pub mouth_pout_left: f32,
    /// Right pout: upper pucker minus lower pucker.
    pub mouth_pout_right: f32,
    /// Upper lip horizontal shift.
    pub lip_upper_horizontal: f32,
    /// Lower lip horizontal shift.
    pub lip_lower_horizontal: f32,
    /// Top-left lip funnel.
    pub lip_top_left_overturn: f32,
    /// Top-right lip funnel.
    pub lip_top_right_overturn: f32,
    /// Bottom-left lip funnel.
    pub lip_bottom_left_overturn: f32,
    /// Bottom-right lip funnel.
    pub lip_bottom_right_overturn: f32,
    /// Top-left lip suck, negated.
    pub lip_top_left_over_under: f32,
    /// Top-right lip suck, negated.
    pub lip_top_right_over_under: f32,
    /// Bottom-left lip suck, negated.
    pub lip_bottom_left_over_under: f32,
    /// Bottom-right lip suck, negated.
    pub lip_bottom_right_over_under: f32,
    /// Left stretch minus tightener.
    pub lip_left_stretch_tighten: f32,
    /// Right stretch minus tightener.
    pub lip_right_stretch_tighten: f32,
    /// Left lip press.
    pub lips_left_press: f32,
    /// Right lip press.
    pub lips_right_press: f32,
    /// Left nose wrinkle (sneer).
    pub nose_wrinkle_left: f32,
    /// Right nose wrinkle (sneer).
    pub nose_wrinkle_right: f32,
    /// Lower chin raise.
    pub chin_raise_bottom: f32,
    /// Upper chin raise.
    pub chin_raise_top: f32,
    /// Whether the face branch produced output this tick.
    pub is_tracking: bool,
    /// Whether the source device counts as active.
    pub is_device_active: bool,
}
