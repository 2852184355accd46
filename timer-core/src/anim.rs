//! Frame-driven animation primitives.
//!
//! Nothing here owns a clock. Callers pass the current monotonic time in
//! milliseconds, so every value is reproducible in tests.

use std::f32::consts::TAU;

/// Material "standard" curve, cubic-bezier(0.4, 0.0, 0.2, 1.0). Maps
/// linear time `t` in `[0, 1]` onto eased progress.
pub fn fast_out_slow_in(t: f32) -> f32 {
    cubic_bezier(0.4, 0.0, 0.2, 1.0, t.clamp(0.0, 1.0))
}

/// Evaluate a CSS-style cubic bezier timing curve at `x`.
///
/// The curve runs from (0,0) to (1,1) with control points (x1,y1) and
/// (x2,y2). x(s) is monotonic for x1,x2 in [0,1], so bisection on s finds
/// the parameter whose x matches.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    fn coord(a: f32, b: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a + 3.0 * inv * s * s * b + s * s * s
    }

    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut s = x;
    for _ in 0..32 {
        let cx = coord(x1, x2, s);
        if (cx - x).abs() < 1e-6 {
            break;
        }
        if cx < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    coord(y1, y2, s)
}

/// A value easing from one number to another over a fixed span of time,
/// along the fast-out-slow-in curve.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    start_ms: u64,
    duration_ms: u64,
}

impl Tween {
    /// A tween that has already arrived at `value`.
    pub fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start_ms: 0,
            duration_ms: 0,
        }
    }

    pub fn new(from: f32, to: f32, start_ms: u64, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms,
        }
    }

    pub fn value(&self, now_ms: u64) -> f32 {
        if self.is_finished(now_ms) {
            return self.to;
        }
        let t = now_ms.saturating_sub(self.start_ms) as f32 / self.duration_ms as f32;
        self.from + (self.to - self.from) * fast_out_slow_in(t)
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        self.duration_ms == 0 || now_ms >= self.start_ms.saturating_add(self.duration_ms)
    }

    /// Head for `to`, starting from wherever the tween is right now.
    pub fn retarget(&mut self, to: f32, duration_ms: u64, now_ms: u64) {
        self.from = self.value(now_ms);
        self.to = to;
        self.start_ms = now_ms;
        self.duration_ms = duration_ms;
    }
}

/// An endlessly repeating linear 0..1 ramp whose period can change on the fly.
///
/// The position is accumulated frame by frame rather than derived from a
/// start time, so changing the period never makes the phase jump.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PhaseLoop {
    fraction: f64,
    period_ms: u64,
    last_ms: u64,
}

impl PhaseLoop {
    pub fn new(period_ms: u64, now_ms: u64) -> Self {
        Self {
            fraction: 0.0,
            period_ms,
            last_ms: now_ms,
        }
    }

    pub fn advance(&mut self, now_ms: u64) {
        let dt = now_ms.saturating_sub(self.last_ms);
        self.last_ms = self.last_ms.max(now_ms);
        if self.period_ms == 0 {
            return;
        }
        self.fraction = (self.fraction + dt as f64 / self.period_ms as f64).fract();
    }

    /// Change the loop length. Time up to `now_ms` is accounted at the old
    /// period first.
    pub fn set_period(&mut self, period_ms: u64, now_ms: u64) {
        self.advance(now_ms);
        self.period_ms = period_ms;
    }

    /// Position in the current loop, `[0, 1)`.
    pub fn fraction(&self) -> f32 {
        self.fraction as f32
    }

    /// Position as an angle, `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        self.fraction() * TAU
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(fast_out_slow_in(0.0), 0.0);
        assert_eq!(fast_out_slow_in(1.0), 1.0);
        assert_eq!(fast_out_slow_in(-3.0), 0.0);
        assert_eq!(fast_out_slow_in(7.0), 1.0);
    }

    #[test]
    fn test_fast_out_slow_in_shape() {
        // Ahead of linear past the start, monotonic throughout
        let mid = fast_out_slow_in(0.5);
        assert!(mid > 0.5 && mid < 1.0);

        let mut last = 0.0;
        for i in 0..=100 {
            let v = fast_out_slow_in(i as f32 / 100.0);
            assert!(v + 1e-5 >= last);
            last = v;
        }
    }

    #[test]
    fn test_tween_progresses_and_finishes() {
        let tw = Tween::new(0.0, 10.0, 1_000, 300);
        assert_eq!(tw.value(1_000), 0.0);
        assert!(close(tw.value(1_150), 10.0 * fast_out_slow_in(0.5)));
        assert_eq!(tw.value(1_300), 10.0);
        assert_eq!(tw.value(9_999), 10.0);
        assert!(!tw.is_finished(1_299));
        assert!(tw.is_finished(1_300));
    }

    #[test]
    fn test_tween_before_start_holds_origin() {
        let tw = Tween::new(2.0, 4.0, 1_000, 300);
        assert_eq!(tw.value(500), 2.0);
    }

    #[test]
    fn test_tween_retarget_from_in_flight_value() {
        let mut tw = Tween::new(0.0, 10.0, 0, 100);
        let halfway = tw.value(50);
        tw.retarget(0.0, 100, 50);
        assert!(close(tw.value(50), halfway));
        assert!(close(tw.value(100), halfway * (1.0 - fast_out_slow_in(0.5))));
        assert_eq!(tw.value(150), 0.0);
    }

    #[test]
    fn test_settled_tween_is_finished() {
        let tw = Tween::settled(3.0);
        assert_eq!(tw.value(0), 3.0);
        assert!(tw.is_finished(0));
    }

    #[test]
    fn test_phase_loop_wraps() {
        let mut ph = PhaseLoop::new(1_000, 0);
        ph.advance(250);
        assert!(close(ph.fraction(), 0.25));
        ph.advance(1_100);
        assert!(close(ph.fraction(), 0.1));
        assert!(ph.angle() >= 0.0 && ph.angle() < TAU);
    }

    #[test]
    fn test_phase_loop_period_change_is_continuous() {
        let mut ph = PhaseLoop::new(5_000, 0);
        ph.advance(2_500);
        let before = ph.fraction();
        ph.set_period(1_500, 2_500);
        assert_eq!(ph.fraction(), before);

        ph.advance(2_650);
        assert!(close(ph.fraction(), 0.6));
    }

    #[test]
    fn test_phase_loop_ignores_clock_going_back() {
        let mut ph = PhaseLoop::new(1_000, 500);
        ph.advance(400);
        assert_eq!(ph.fraction(), 0.0);
        ph.advance(600);
        assert!(close(ph.fraction(), 0.1));
    }
}
