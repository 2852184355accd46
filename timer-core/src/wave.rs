//! Wave fill geometry.
//!
//! `WaveRenderer` owns the three animations behind the visualization
//! (phase rotation, amplitude easing, progress easing) and turns them into
//! a `WaveFrame`: a short list of shapes with colors and alphas that any
//! drawing surface can replay. Coordinates are y-down, origin top left.

use std::f32::consts::TAU;

use crate::anim::{PhaseLoop, Tween};
use crate::countdown::{progress_fraction, TimerState};

pub const RUNNING_AMPLITUDE: f32 = 16.0;
pub const IDLE_AMPLITUDE: f32 = 8.0;
pub const RUNNING_AMPLITUDE_MS: u64 = 300;
pub const IDLE_AMPLITUDE_MS: u64 = 2000;

pub const RUNNING_PERIOD_MS: u64 = 1500;
pub const IDLE_PERIOD_MS: u64 = 5000;

/// Easing time for jumps in the displayed progress.
pub const PROGRESS_TRANSITION_MS: u64 = 300;

/// Horizontal distance between wave samples.
pub const SAMPLE_STEP: usize = 10;

/// Fixed radian offset of the secondary wave. Not reduced mod 2π.
pub const BOTTOM_WAVE_PHASE_SHIFT: f32 = 8.0;

pub const FILL_ALPHAS: [f32; 2] = [0.5, 0.3];
pub const TOP_WAVE_ALPHA: f32 = 0.5;
pub const BOTTOM_WAVE_ALPHA: f32 = 0.3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Composite this color at `alpha` over an opaque `background`.
    pub fn over(self, background: Color, alpha: f32) -> Color {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * a + f32::from(bg) * (1.0 - a)).round() as u8
        };
        Color {
            r: mix(self.r, background.r),
            g: mix(self.g, background.g),
            b: mix(self.b, background.b),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Shape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Open outline; the region between it and the baseline is the fill.
    Path(Vec<Point>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct DrawOp {
    pub shape: Shape,
    pub color: Color,
    pub alpha: f32,
}

/// Everything needed to paint one frame of the wave.
#[derive(Clone, PartialEq, Debug)]
pub struct WaveFrame {
    pub width: f32,
    pub height: f32,
    /// Baseline of both waves; everything below it is filled.
    pub top_offset: f32,
    /// Paint in order.
    pub ops: Vec<DrawOp>,
}

/// Height the baseline travels over. The extra room lets a full-size wave
/// crest sink completely out of view at zero progress.
pub fn drawable_height(height: f32) -> f32 {
    height + 2.0 * RUNNING_AMPLITUDE
}

/// Sample one wave across `width`, anchored at `top_offset`.
pub fn wave_path(width: f32, top_offset: f32, amplitude: f32, phase: f32) -> Vec<Point> {
    let mut points = Vec::with_capacity(width as usize / SAMPLE_STEP + 3);
    points.push(Point { x: 0.0, y: top_offset });
    for x in (0..=width as usize).step_by(SAMPLE_STEP) {
        let x = x as f32;
        let scaled_x = x * TAU / width;
        let y = amplitude * (scaled_x + phase).sin() + amplitude;
        points.push(Point {
            x,
            y: top_offset - y,
        });
    }
    points.push(Point {
        x: width,
        y: top_offset,
    });
    points
}

/// Build the draw list for one frame.
pub fn build_frame(
    progress: f32,
    amplitude: f32,
    phase: f32,
    width: f32,
    height: f32,
    color: Color,
) -> WaveFrame {
    let progress = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let top_offset = drawable_height(height) * (1.0 - progress);

    let mut frame = WaveFrame {
        width,
        height,
        top_offset,
        ops: Vec::new(),
    };
    if !(width >= 1.0 && height >= 1.0) {
        return frame;
    }

    let fill_height = (height - top_offset).max(0.0);
    for alpha in FILL_ALPHAS {
        frame.ops.push(DrawOp {
            shape: Shape::Rect {
                x: 0.0,
                y: top_offset,
                width,
                height: fill_height,
            },
            color,
            alpha,
        });
    }
    frame.ops.push(DrawOp {
        shape: Shape::Path(wave_path(width, top_offset, amplitude, phase)),
        color,
        alpha: TOP_WAVE_ALPHA,
    });
    frame.ops.push(DrawOp {
        shape: Shape::Path(wave_path(
            width,
            top_offset,
            amplitude,
            phase + BOTTOM_WAVE_PHASE_SHIFT,
        )),
        color,
        alpha: BOTTOM_WAVE_ALPHA,
    });
    frame
}

/// Displayed progress: the live fraction, except while a jump is easing.
#[derive(Clone, Copy, PartialEq, Debug)]
struct ProgressEasing {
    tween: Tween,
    active: bool,
}

pub struct WaveRenderer {
    color: Color,
    running: bool,
    phase: PhaseLoop,
    amplitude: Tween,
    progress: ProgressEasing,
}

impl WaveRenderer {
    pub fn new(color: Color, now_ms: u64) -> Self {
        Self {
            color,
            running: false,
            phase: PhaseLoop::new(IDLE_PERIOD_MS, now_ms),
            amplitude: Tween::settled(IDLE_AMPLITUDE),
            progress: ProgressEasing {
                tween: Tween::settled(0.0),
                active: false,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switch between the calm and the busy wave. Only an actual change
    /// restarts the amplitude easing.
    pub fn set_running(&mut self, running: bool, now_ms: u64) {
        if running == self.running {
            return;
        }
        self.running = running;
        let (period, amplitude, easing_ms) = if running {
            (RUNNING_PERIOD_MS, RUNNING_AMPLITUDE, RUNNING_AMPLITUDE_MS)
        } else {
            (IDLE_PERIOD_MS, IDLE_AMPLITUDE, IDLE_AMPLITUDE_MS)
        };
        self.phase.set_period(period, now_ms);
        self.amplitude.retarget(amplitude, easing_ms, now_ms);
    }

    /// Per-frame update of the phase rotation.
    pub fn advance(&mut self, now_ms: u64) {
        self.phase.advance(now_ms);
    }

    pub fn amplitude(&self, now_ms: u64) -> f32 {
        self.amplitude.value(now_ms)
    }

    pub fn phase(&self) -> f32 {
        self.phase.angle()
    }

    /// Ease the displayed progress from its current value to `target`.
    pub fn animate_progress_to(&mut self, target: f32, live: f32, now_ms: u64) {
        let current = self.displayed_progress(live, now_ms);
        self.progress.tween = Tween::new(current, target, now_ms, PROGRESS_TRANSITION_MS);
        self.progress.active = true;
    }

    /// Entry animation for a freshly selected countdown: rise from empty to
    /// where the live countdown will be once the transition is over.
    pub fn on_duration_selected(&mut self, state: &TimerState, now_ms: u64) {
        let landing = progress_fraction(
            state.time_left_ms.saturating_sub(PROGRESS_TRANSITION_MS),
            state.initial_time_ms,
        );
        self.progress.active = false;
        self.animate_progress_to(landing, 0.0, now_ms);
    }

    /// Drain animation for a reset: from the live fraction down to empty.
    pub fn on_reset(&mut self, live: f32, now_ms: u64) {
        self.progress.active = false;
        self.animate_progress_to(0.0, live, now_ms);
    }

    pub fn progress_in_flight(&self, now_ms: u64) -> bool {
        self.progress.active && !self.progress.tween.is_finished(now_ms)
    }

    pub fn displayed_progress(&self, live: f32, now_ms: u64) -> f32 {
        if self.progress_in_flight(now_ms) {
            self.progress.tween.value(now_ms)
        } else {
            live
        }
    }

    /// Geometry for this frame. `live` is the countdown's own progress
    /// fraction; it is replaced by the eased value during a transition.
    pub fn frame(&self, live: f32, width: f32, height: f32, now_ms: u64) -> WaveFrame {
        build_frame(
            self.displayed_progress(live, now_ms),
            self.amplitude(now_ms),
            self.phase(),
            width,
            height,
            self.color,
        )
    }
}
