//! Pure countdown and wave animation logic with no platform dependencies.
//! Testable on host; the terminal front end only supplies a clock and a
//! drawing surface.

pub mod anim;
pub mod countdown;
pub mod wave;

pub use anim::{fast_out_slow_in, PhaseLoop, Tween};
pub use countdown::{
    preset_index, progress_fraction, tick, Mode, TimerState, DEFAULT_PRESET_SECONDS,
    PRESET_SECONDS,
};
pub use wave::{build_frame, Color, DrawOp, Point, Shape, WaveFrame, WaveRenderer};

/// Whole seconds left, rounded down. This is the big number on screen.
pub fn whole_seconds(ms: u64) -> u64 {
    ms / 1000
}

/// Format milliseconds as "MM:SS"
pub fn format_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let m = total_secs / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}", m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_seconds_rounds_down() {
        assert_eq!(whole_seconds(0), 0);
        assert_eq!(whole_seconds(999), 0);
        assert_eq!(whole_seconds(29_999), 29);
        assert_eq!(whole_seconds(30_000), 30);
    }

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(0), "00:00");
        assert_eq!(format_ms(60_000), "01:00");
        assert_eq!(format_ms(29_999), "00:29");
        assert_eq!(format_ms(305_000), "05:05");
    }
}
