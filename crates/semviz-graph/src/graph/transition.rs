//! Timed transitions
//!
//! A transition is a pure function of elapsed time over a captured
//! `(from, to)` pair. Restarting mid-flight captures the value currently
//! shown as the new `from`, so a second click never waits for the first
//! animation to finish and never jumps.

use egui::{Pos2, Rect};

// =============================================================================
// EASING FUNCTIONS
// =============================================================================

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Fast start, slow finish
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Slow start and finish (d3's default transition easing)
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => linear(t),
            Easing::EaseOutCubic => ease_out_cubic(t),
            Easing::EaseInOutCubic => ease_in_out_cubic(t),
        }
    }
}

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Values that can be linearly interpolated
pub trait Lerp: Copy {
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Pos2 {
    fn interpolate(self, to: Self, t: f32) -> Self {
        Pos2::new(self.x.interpolate(to.x, t), self.y.interpolate(to.y, t))
    }
}

impl Lerp for Rect {
    fn interpolate(self, to: Self, t: f32) -> Self {
        Rect::from_min_max(self.min.interpolate(to.min, t), self.max.interpolate(to.max, t))
    }
}

// =============================================================================
// TIMELINE
// =============================================================================

/// Elapsed-time clock for one transition
#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::finished()
    }
}

impl Timeline {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.001),
            easing,
        }
    }

    /// A timeline that has already completed
    pub fn finished() -> Self {
        Self {
            elapsed: 1.0,
            duration: 1.0,
            easing: Easing::default(),
        }
    }

    /// Advance. Returns true while still running.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        !self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Raw progress in [0, 1]
    pub fn raw(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Eased progress in [0, 1]
    pub fn progress(&self) -> f32 {
        self.easing.apply(self.raw())
    }

    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

// =============================================================================
// TWEEN
// =============================================================================

/// Single-value transition between a captured start and end
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    timeline: Timeline,
}

impl<T: Lerp> Tween<T> {
    /// Already settled at `value`
    pub fn settled(value: T) -> Self {
        Self {
            from: value,
            to: value,
            timeline: Timeline::finished(),
        }
    }

    pub fn new(from: T, to: T, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            timeline: Timeline::new(duration, easing),
        }
    }

    /// Value at the current elapsed time
    pub fn value(&self) -> T {
        self.from.interpolate(self.to, self.timeline.progress())
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Restart toward `to` from the value currently shown
    pub fn retarget(&mut self, to: T, duration: f32, easing: Easing) {
        self.from = self.value();
        self.to = to;
        self.timeline = Timeline::new(duration, easing);
    }

    /// Restart from an explicit start value
    pub fn restart(&mut self, from: T, to: T, duration: f32, easing: Easing) {
        *self = Self::new(from, to, duration, easing);
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        self.timeline.tick(dt)
    }

    pub fn is_animating(&self) -> bool {
        !self.timeline.is_finished()
    }

    pub fn finish(&mut self) {
        self.timeline.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseInOutCubic] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_timeline_runs_to_completion() {
        let mut timeline = Timeline::new(0.75, Easing::Linear);
        assert!(timeline.tick(0.25));
        assert!((timeline.progress() - 1.0 / 3.0).abs() < 1e-5);
        assert!(!timeline.tick(1.0));
        assert!(timeline.is_finished());
        assert_eq!(timeline.progress(), 1.0);
        assert!(!timeline.tick(0.1));
    }

    #[test]
    fn test_tween_value_is_function_of_elapsed() {
        let mut tween = Tween::new(0.0_f32, 10.0, 1.0, Easing::Linear);
        tween.tick(0.5);
        assert_eq!(tween.value(), 5.0);
        tween.tick(0.5);
        assert_eq!(tween.value(), 10.0);
        assert!(!tween.is_animating());
    }

    #[test]
    fn test_retarget_starts_from_shown_value() {
        let mut tween = Tween::new(0.0_f32, 10.0, 1.0, Easing::Linear);
        tween.tick(0.4);
        tween.retarget(0.0, 1.0, Easing::Linear);
        assert_eq!(tween.value(), 4.0);
        tween.tick(0.5);
        assert_eq!(tween.value(), 2.0);
    }

    #[test]
    fn test_settled_is_not_animating() {
        let tween = Tween::settled(Pos2::new(1.0, 2.0));
        assert!(!tween.is_animating());
        assert_eq!(tween.value(), Pos2::new(1.0, 2.0));
    }

    #[test]
    fn test_rect_lerp() {
        let a = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        let b = Rect::from_min_max(Pos2::new(10.0, 10.0), Pos2::new(30.0, 30.0));
        let mid = a.interpolate(b, 0.5);
        assert_eq!(mid.min, Pos2::new(5.0, 5.0));
        assert_eq!(mid.max, Pos2::new(20.0, 20.0));
    }
}
