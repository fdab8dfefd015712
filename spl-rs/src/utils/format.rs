//! Formatting utilities

use humansize::{DECIMAL, format_size};
use spl_fx::fx::FRAMES_PER_SECOND;

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a duration in seconds with its frame count, e.g. `0.500s (15f)`
pub fn format_duration(seconds: f32) -> String {
    let frames = (seconds * FRAMES_PER_SECOND as f32).round();
    format!("{seconds:.3}s ({frames}f)")
}

/// Format an emitter life time, where zero means emitting forever
pub fn format_life_time(seconds: f32) -> String {
    if seconds <= 0.0 {
        "forever".to_string()
    } else {
        format_duration(seconds)
    }
}
