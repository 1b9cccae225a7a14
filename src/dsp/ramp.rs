//! Linear parameter ramps.
//!
//! A ramp glides a control value from where it is now to a target over a
//! whole number of samples. Abrupt jumps in feedback or cutoff are audible as
//! "zipper noise", so every parameter the reverb chain reads goes through one
//! of these.
//!
//! ```text
//! value
//!   target ┤            ●━━━━━━━━━
//!          │         ●
//!          │      ●                  step = (target - current) / samples
//!          │   ●
//!  current ┤●
//!          └──┬──┬──┬──┬──┬──→ samples
//! ```
//!
//! Each value is computed from the ramp's start point as `start + step * n`
//! rather than by adding `step` to the previous value, so rounding never
//! accumulates over long ramps. Values are clamped so they never pass
//! `target`, and the final step lands on `target` exactly.

/// Audio-thread ramp state. Allocation-free and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    current: f32,
    target: f32,
    start: f32,
    step: f32,
    elapsed: u32,
    remaining: u32,
}

impl Ramp {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            start: value,
            step: 0.0,
            elapsed: 0,
            remaining: 0,
        }
    }

    /// Start gliding toward `target` over `samples` calls to [`advance`].
    ///
    /// `samples == 0` jumps: the next `advance` returns `target`.
    ///
    /// [`advance`]: Ramp::advance
    pub fn set_target(&mut self, target: f32, samples: u32) {
        self.target = target;
        self.start = self.current;
        self.elapsed = 0;
        self.remaining = samples;
        self.step = if samples == 0 {
            0.0
        } else {
            (target - self.current) / samples as f32
        };
    }

    /// Jump to `value` immediately, discarding any ramp in flight.
    pub fn set_immediate(&mut self, value: f32) {
        *self = Self::new(value);
    }

    /// Finish any ramp in flight right now.
    pub fn snap(&mut self) {
        self.set_immediate(self.target);
    }

    /// Move one sample along the ramp and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 1 {
            self.remaining -= 1;
            self.elapsed += 1;
            let value = self.start + self.step * self.elapsed as f32;
            self.current = if self.step >= 0.0 {
                value.min(self.target)
            } else {
                value.max(self.target)
            };
        } else {
            self.remaining = 0;
            self.current = self.target;
        }
        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True while the value is still moving.
    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0 || self.current != self.target
    }
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Number of samples a ramp of `duration_secs` lasts at `sample_rate`.
///
/// Rounds up so a ramp never finishes early. Non-positive durations are zero
/// samples; durations longer than `u32::MAX` samples saturate.
pub fn ramp_samples(duration_secs: f32, sample_rate: f32) -> u32 {
    let samples = (duration_secs as f64 * sample_rate as f64).ceil();
    if samples <= 0.0 {
        0
    } else if samples >= u32::MAX as f64 {
        u32::MAX
    } else {
        samples as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lands_exactly_on_target() {
        let sample_rate = 48_000.0;
        for &(start, target, duration) in &[
            (0.0f32, 1.0f32, 0.02f32),
            (0.6, 0.1, 0.02),
            (4_000.0, 12.0, 0.5),
            (0.333, 0.777, 0.0001),
            (12.0, 20_000.0, 1.0),
        ] {
            let mut ramp = Ramp::new(start);
            let samples = ramp_samples(duration, sample_rate);
            ramp.set_target(target, samples);

            for _ in 0..samples {
                ramp.advance();
            }

            assert_eq!(ramp.current(), target, "{start} -> {target} over {duration}s");
            assert_eq!(ramp.remaining(), 0);
            assert!(!ramp.is_ramping());
        }
    }

    #[test]
    fn test_monotonic_without_overshoot() {
        let mut up = Ramp::new(0.1);
        up.set_target(0.9, 997);
        let mut prev = up.current();
        for _ in 0..997 {
            let v = up.advance();
            assert!(v >= prev, "rising ramp went backwards: {prev} -> {v}");
            assert!(v <= 0.9, "rising ramp overshot: {v}");
            prev = v;
        }

        let mut down = Ramp::new(20_000.0);
        down.set_target(12.0, 960);
        let mut prev = down.current();
        for _ in 0..960 {
            let v = down.advance();
            assert!(v <= prev, "falling ramp went backwards: {prev} -> {v}");
            assert!(v >= 12.0, "falling ramp overshot: {v}");
            prev = v;
        }
    }

    /// Ten-second ramps at 48 kHz: long enough that per-sample accumulation
    /// would drift past the target.
    #[test]
    fn test_long_ramps_stay_monotonic_and_in_range() {
        let samples = ramp_samples(10.0, 48_000.0);
        assert_eq!(samples, 480_000);

        for &(start, target) in &[
            (0.0f32, 0.999f32),
            (20_000.0, 12.0),
            (12.0, 20_000.0),
            (0.0, 1.0),
            (1.0, 0.0),
        ] {
            let mut ramp = Ramp::new(start);
            ramp.set_target(target, samples);
            let rising = target > start;
            let mut prev = start;

            for i in 0..samples {
                let v = ramp.advance();
                if rising {
                    assert!(v >= prev, "{start} -> {target}: went back at {i}: {prev} -> {v}");
                    assert!(v <= target, "{start} -> {target}: overshot at {i}: {v}");
                } else {
                    assert!(v <= prev, "{start} -> {target}: went back at {i}: {prev} -> {v}");
                    assert!(v >= target, "{start} -> {target}: overshot at {i}: {v}");
                }
                prev = v;
            }
            assert_eq!(ramp.current(), target);
        }
    }

    #[test]
    fn test_zero_duration_snaps_on_next_advance() {
        let mut ramp = Ramp::new(0.2);
        ramp.set_target(0.8, ramp_samples(0.0, 48_000.0));
        assert_eq!(ramp.current(), 0.2);
        assert_eq!(ramp.advance(), 0.8);
        assert_eq!(ramp.advance(), 0.8);
    }

    #[test]
    fn test_retarget_mid_ramp_starts_from_current() {
        let mut ramp = Ramp::new(0.0);
        ramp.set_target(1.0, 100);
        for _ in 0..50 {
            ramp.advance();
        }
        let midway = ramp.current();
        assert!((midway - 0.5).abs() < 1e-5);

        ramp.set_target(0.0, 10);
        let first = ramp.advance();
        assert!(first < midway);
        for _ in 0..9 {
            ramp.advance();
        }
        assert_eq!(ramp.current(), 0.0);
    }

    #[test]
    fn test_snap_discards_ramp() {
        let mut ramp = Ramp::new(0.0);
        ramp.set_target(1.0, 1_000);
        ramp.advance();
        ramp.snap();
        assert_eq!(ramp.current(), 1.0);
        assert_eq!(ramp.remaining(), 0);
    }

    #[test]
    fn test_ramp_samples_rounds_up() {
        assert_eq!(ramp_samples(0.02, 48_000.0), 960);
        assert_eq!(ramp_samples(0.02, 44_100.0), 882);
        assert_eq!(ramp_samples(1.0 / 48_000.0 * 1.5, 48_000.0), 2);
        assert_eq!(ramp_samples(0.0, 48_000.0), 0);
        assert_eq!(ramp_samples(-1.0, 48_000.0), 0);
    }
}
