//! Gain fades
//!
//! A fade moves a source's gain linearly from its value at fade start to a
//! target over a fixed duration. Fades are not timer driven: the owning
//! source asks the fade for the next gain each time it is polled, so the
//! audible smoothness depends on the caller's poll rate.
//!
//! All calculations take the current time as an argument and never read a
//! clock themselves.

use oas_common::Time;

/// Next action for a fade at a given time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Gain already equals the target; the fade is over with nothing to write
    Reached,
    /// End time reached or passed; write exactly this (target) gain
    Finish(f32),
    /// Fade in progress; write this interpolated gain
    Ramp(f32),
}

/// An in-progress linear gain fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    start: Time,
    end: Time,
    start_gain: f32,
    target_gain: f32,
    gain_delta: f32,
    duration: f64,
}

impl Fade {
    /// Begin a fade at `now`
    ///
    /// Negative or NaN durations are treated as zero, which makes the
    /// fade finish on its first step.
    pub fn new(start_gain: f32, target_gain: f32, duration_secs: f64, now: Time) -> Self {
        let duration = Time::from_secs_f64(duration_secs);
        Self {
            start: now,
            end: now + duration,
            start_gain,
            target_gain,
            gain_delta: target_gain - start_gain,
            duration: duration.as_secs_f64(),
        }
    }

    pub fn start_time(&self) -> Time {
        self.start
    }

    pub fn end_time(&self) -> Time {
        self.end
    }

    pub fn start_gain(&self) -> f32 {
        self.start_gain
    }

    pub fn target_gain(&self) -> f32 {
        self.target_gain
    }

    pub fn gain_delta(&self) -> f32 {
        self.gain_delta
    }

    /// Fade length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Decide what to do at `now` given the source's current gain
    pub fn step(&self, now: Time, current_gain: f32) -> FadeStep {
        if current_gain == self.target_gain {
            FadeStep::Reached
        } else if now >= self.end {
            FadeStep::Finish(self.target_gain)
        } else {
            FadeStep::Ramp(self.gain_at(now))
        }
    }

    /// Fraction of the fade elapsed at `now`, clamped to at most 1
    pub fn progress(&self, now: Time) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = (now - self.start).as_secs_f64();
        (elapsed / self.duration).min(1.0)
    }

    /// Interpolated gain at `now`
    pub fn gain_at(&self, now: Time) -> f32 {
        self.start_gain + self.progress(now) as f32 * self.gain_delta
    }

    /// Time left until the fade ends (zero once passed)
    pub fn remaining(&self, now: Time) -> Time {
        self.end - now
    }
}
