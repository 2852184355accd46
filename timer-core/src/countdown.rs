//! Countdown state machine.
//!
//! `TimerState` is a plain value. Every transition consumes the old state
//! and returns the new one, so a frame loop can drive it with
//! `state = tick(state, now_ms)` and nothing else.

/// Selectable countdown lengths in seconds, ascending.
pub const PRESET_SECONDS: [u32; 12] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60];

pub const DEFAULT_PRESET_SECONDS: u32 = 30;

/// Index of `seconds` in `PRESET_SECONDS`, if it is a preset.
pub fn preset_index(seconds: u32) -> Option<usize> {
    PRESET_SECONDS.iter().position(|&s| s == seconds)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Selecting,
    Running,
    Paused,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimerState {
    pub mode: Mode,
    /// Length picked on the selector. Only used as the progress denominator.
    pub initial_time_ms: u64,
    /// Remaining time as of the last pause.
    pub total_time_ms: u64,
    pub time_left_ms: u64,
    pub start_timestamp_ms: u64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerState {
    pub const fn new() -> Self {
        Self {
            mode: Mode::Selecting,
            initial_time_ms: 0,
            total_time_ms: 0,
            time_left_ms: 0,
            start_timestamp_ms: 0,
        }
    }

    pub fn select_duration(self, seconds: u32, now_ms: u64) -> Self {
        if self.mode != Mode::Selecting {
            return self;
        }
        let duration_ms = u64::from(seconds) * 1000;
        Self {
            mode: Mode::Running,
            initial_time_ms: duration_ms,
            total_time_ms: duration_ms,
            time_left_ms: duration_ms,
            start_timestamp_ms: now_ms,
        }
    }

    pub fn pause(self) -> Self {
        if self.mode != Mode::Running {
            return self;
        }
        Self {
            mode: Mode::Paused,
            total_time_ms: self.time_left_ms,
            ..self
        }
    }

    pub fn resume(self, now_ms: u64) -> Self {
        if self.mode != Mode::Paused {
            return self;
        }
        Self {
            mode: Mode::Running,
            start_timestamp_ms: now_ms,
            ..self
        }
    }

    /// Back to the selector. The countdown fields are cleared; they carry no
    /// meaning until the next `select_duration`.
    pub fn reset(self) -> Self {
        match self.mode {
            Mode::Running | Mode::Paused => Self::new(),
            Mode::Selecting => self,
        }
    }

    pub fn tick(self, now_ms: u64) -> Self {
        tick(self, now_ms)
    }

    pub fn is_running(&self) -> bool {
        self.mode == Mode::Running
    }

    /// Fraction of the initial duration still remaining, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        progress_fraction(self.time_left_ms, self.initial_time_ms)
    }
}

/// Recompute the remaining time for one frame.
///
/// Identity unless running. Reaching zero is the only transition not
/// initiated by the user: the state drops back to `Selecting` with
/// `time_left_ms == 0`.
pub fn tick(state: TimerState, now_ms: u64) -> TimerState {
    if state.mode != Mode::Running {
        return state;
    }
    let elapsed = now_ms.saturating_sub(state.start_timestamp_ms);
    let time_left_ms = state.total_time_ms.saturating_sub(elapsed);
    if time_left_ms == 0 {
        TimerState {
            mode: Mode::Selecting,
            time_left_ms: 0,
            ..state
        }
    } else {
        TimerState {
            time_left_ms,
            ..state
        }
    }
}

/// `remaining / initial`, clamped to `[0, 1]`. A zero denominator gives 0.
pub fn progress_fraction(remaining_ms: u64, initial_ms: u64) -> f32 {
    if initial_ms == 0 {
        return 0.0;
    }
    let frac = remaining_ms as f64 / initial_ms as f64;
    frac.clamp(0.0, 1.0) as f32
}
