//! Fixed-point, frame and angle conversions.
//!
//! Archives store lengths as 20.12 (`fx32`) or 4.12 (`fx16`) fixed point,
//! durations as frame counts at 30 frames per second and angles as 16-bit
//! indices into a full turn.

use std::f32::consts::TAU;

/// Fractional bits of the fixed-point formats
pub const FX_SHIFT: u32 = 12;

/// Fixed-point representation of 1.0
pub const FX_ONE: i32 = 1 << FX_SHIFT;

/// Hardware frame rate that all durations are expressed in
pub const FRAMES_PER_SECOND: u32 = 30;

/// Slack for comparisons against accumulated step times
pub(crate) const TIME_EPSILON: f32 = 1e-4;

/// Absorbs f32 error when turning a duration back into whole frames
const FRAME_EPSILON: f32 = 1.0 / 256.0;

/// Convert a float to 20.12 fixed point, rounding half away from zero
pub fn to_fixed(value: f32) -> i32 {
    let scaled = value * FX_ONE as f32;
    if value > 0.0 {
        (scaled + 0.5) as i32
    } else {
        (scaled - 0.5) as i32
    }
}

/// Convert 20.12 fixed point to a float
pub fn to_float(value: i32) -> f32 {
    value as f32 / FX_ONE as f32
}

/// Convert 4.12 fixed point to a float
pub fn fx16_to_float(value: i16) -> f32 {
    to_float(i32::from(value))
}

/// Convert a float to 4.12 fixed point, saturating at the 16-bit range
pub fn to_fx16(value: f32) -> i16 {
    to_fixed(value).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Convert a frame count to seconds
pub fn to_seconds(frames: u16) -> f32 {
    f32::from(frames) / FRAMES_PER_SECOND as f32
}

/// Convert seconds to whole frames
///
/// Exact inverse of [`to_seconds`] for every `u16`. Negative durations map to 0.
pub fn to_frames(seconds: f32) -> u16 {
    (seconds * FRAMES_PER_SECOND as f32 + FRAME_EPSILON) as u16
}

/// Length of a time step in hardware frames
pub fn frames_in(delta: f32) -> f32 {
    delta * FRAMES_PER_SECOND as f32
}

/// Convert a 16-bit angle index to radians
pub fn angle_to_radians(index: u16) -> f32 {
    f32::from(index) / 65536.0 * TAU
}

/// Convert a signed per-frame rotation step to radians
pub fn rotation_to_radians(step: i16) -> f32 {
    f32::from(step) / 65536.0 * TAU
}

/// Convert radians to a 16-bit angle index, wrapping at a full turn
pub fn radians_to_angle(radians: f32) -> u16 {
    let turns = (radians / TAU).rem_euclid(1.0);
    ((turns * 65536.0) as u32 & 0xFFFF) as u16
}

/// Normalize an 8-bit ratio to `0.0..=1.0`
pub fn ratio(value: u8) -> f32 {
    f32::from(value) / 255.0
}
