//! Animation timing.
//!
//! All animations are driven from a shared [`Clock`]. Nothing here schedules
//! callbacks; an [`Animation`] computes its current value on demand from the
//! clock, and whoever owns the frame loop advances the clock and polls. This
//! also makes every animation fully deterministic in tests.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use keyframe::functions::{EaseInOutQuart, EaseOutCubic, EaseOutQuad};
use keyframe::EasingFunction;

/// Clock that drives animations.
///
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    time: Rc<Cell<Duration>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current time.
    pub fn now(&self) -> Duration {
        self.time.get()
    }

    /// Sets the current time.
    pub fn set(&self, time: Duration) {
        self.time.set(time);
    }

    /// Advances the current time.
    pub fn advance(&self, by: Duration) {
        self.time.set(self.time.get() + by);
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.time, &other.time)
    }
}

impl Eq for Clock {}

/// A value animating from one point to another over time.
#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    delay: Duration,
    start_time: Duration,
    curve: Curve,
    is_off: bool,
    clock: Clock,
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, config: lostfound_config::Animation) -> Self {
        Self {
            from,
            to,
            duration: Duration::from_millis(u64::from(config.duration_ms)),
            delay: Duration::from_millis(u64::from(config.delay_ms)),
            start_time: clock.now(),
            curve: Curve::from(config.curve),
            is_off: config.off,
            clock,
        }
    }

    /// Pushes the animation start further into the future.
    ///
    /// Used for staggering items within a batch. No-op for disabled
    /// animations, which must stay instant.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        if !self.is_off {
            self.delay += delay;
        }
        self
    }

    /// Scales the duration and delay by the given factor.
    pub fn slowed_down(mut self, slowdown: f64) -> Self {
        let slowdown = slowdown.clamp(0., 100.);
        self.duration = self.duration.mul_f64(slowdown);
        self.delay = self.delay.mul_f64(slowdown);
        self
    }

    pub fn value(&self) -> f64 {
        if self.is_off {
            return self.to;
        }

        let now = self.clock.now();
        let start = self.start_time + self.delay;
        if now <= start {
            return self.from;
        }
        let end = start + self.duration;
        if now >= end {
            return self.to;
        }

        let x = (now - start).as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.curve.y(x)
    }

    /// Returns the current value clamped between `from` and `to`.
    pub fn clamped_value(&self) -> f64 {
        let (min, max) = if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        };
        self.value().clamp(min, max)
    }

    pub fn is_done(&self) -> bool {
        self.is_off || self.clock.now() >= self.start_time + self.delay + self.duration
    }

    pub fn to(&self) -> f64 {
        self.to
    }
}

/// Easing curve of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    EaseInOutQuart,
    EaseOutExpo,
}

impl Curve {
    /// Evaluates the curve at `x` ∈ (0, 1).
    pub fn y(self, x: f64) -> f64 {
        match self {
            Curve::Linear => x,
            Curve::EaseOutQuad => EasingFunction::y(&EaseOutQuad, x),
            Curve::EaseOutCubic => EasingFunction::y(&EaseOutCubic, x),
            Curve::EaseInOutQuart => EasingFunction::y(&EaseInOutQuart, x),
            // Not in keyframe.
            Curve::EaseOutExpo => 1. - 2f64.powf(-10. * x),
        }
    }
}

impl From<lostfound_config::AnimationCurve> for Curve {
    fn from(curve: lostfound_config::AnimationCurve) -> Self {
        match curve {
            lostfound_config::AnimationCurve::Linear => Curve::Linear,
            lostfound_config::AnimationCurve::EaseOutQuad => Curve::EaseOutQuad,
            lostfound_config::AnimationCurve::EaseOutCubic => Curve::EaseOutCubic,
            lostfound_config::AnimationCurve::EaseInOutQuart => Curve::EaseInOutQuart,
            lostfound_config::AnimationCurve::EaseOutExpo => Curve::EaseOutExpo,
        }
    }
}
