//! Reverb - Room Simulation via Damped Comb Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation follows the
//! Schroeder/Costello family: parallel feedback combs whose feedback paths are
//! darkened by a one-pole low-pass, followed by series allpass diffusers.
//!
//! # Architecture (per channel)
//!
//! ```text
//! Input ──┬──→ [Comb 1 + LPF] ──┐
//!         ├──→ [Comb 2 + LPF] ──┤
//!         ├──→ [Comb 3 + LPF] ──┼──→ (+) × ¼ ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4 + LPF] ──┘
//! ```
//!
//! ## Damped comb
//!
//! ```text
//! delayed  = ring[n - D]
//! ring[n]  = x[n] + lowpass(delayed) * feedback
//! y[n]     = delayed
//! ```
//!
//! The low-pass in the loop means high frequencies lose energy on every trip
//! around the loop, so the tail gets darker as it decays, like air and soft
//! surfaces absorbing treble in a real room. Lower cutoff = darker tail.
//!
//! Feedback must stay below 1.0. At 1.0 and above every trip around the loop
//! keeps (or gains) energy and the output diverges. This unit does NOT clamp:
//! the caller owns the range (see [`crate::param::FEEDBACK`]).
//!
//! ## Allpass diffusers
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! Allpasses smear the comb echoes into a dense wash without colouring the
//! spectrum. They can be switched off, which turns a zero-feedback reverb into
//! four plain delay taps (handy for testing).
//!
//! # Stereo
//!
//! Every channel runs its own network. Channel `n` lengthens each delay by
//! `n * STEREO_SPREAD` samples so left and right decorrelate.

use std::f32::consts::TAU;

/// Comb delay times in ms (mutually prime-ish, avoid stacked resonances)
pub const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
/// Allpass delay times in ms
pub const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
/// Allpass gain
pub const ALLPASS_GAIN: f32 = 0.5;
/// Extra delay per channel index, in samples
pub const STEREO_SPREAD: usize = 23;

/// Convert a delay time to whole samples (at least one).
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// One-pole low-pass coefficient for `cutoff_hz`.
///
/// `a = e^(-2π·fc/fs)`; 0.0 passes everything, values near 1.0 are very dark.
#[inline]
pub fn lowpass_coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    (-TAU * cutoff_hz / sample_rate).exp()
}

/// One-pole low-pass: `y[n] = (1 - a) x[n] + a y[n-1]`
#[derive(Debug, Default, Clone, Copy)]
pub struct OnePoleLowpass {
    state: f32,
}

impl OnePoleLowpass {
    #[inline]
    pub fn process(&mut self, input: f32, coefficient: f32) -> f32 {
        self.state = input * (1.0 - coefficient) + self.state * coefficient;
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// Feedback comb with a low-pass in the loop (pre-allocated, RT-safe)
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    damping: OnePoleLowpass,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            damping: OnePoleLowpass::default(),
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Process one sample. `coefficient` comes from [`lowpass_coefficient`].
    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32, coefficient: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let filtered = self.damping.process(delayed, coefficient);

        self.buffer[self.write_pos] = input + filtered * feedback;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }

        delayed
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.damping.reset();
        self.write_pos = 0;
    }
}

/// An allpass filter for reverb diffusion (pre-allocated, RT-safe)
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize, gain: f32) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            gain,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.gain * input + delayed;

        self.buffer[self.write_pos] = input + self.gain * output;
        self.write_pos += 1;
        if self.write_pos == self.buffer.len() {
            self.write_pos = 0;
        }

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// One channel's comb/allpass network.
pub struct ReverbChannel {
    combs: [CombFilter; 4],
    allpasses: [AllpassFilter; 2],
}

impl ReverbChannel {
    pub fn new(sample_rate: f32, spread: usize) -> Self {
        let comb = |ms: f32| CombFilter::new(ms_to_samples(ms, sample_rate) + spread);
        let allpass =
            |ms: f32| AllpassFilter::new(ms_to_samples(ms, sample_rate) + spread, ALLPASS_GAIN);

        Self {
            combs: COMB_DELAYS_MS.map(comb),
            allpasses: ALLPASS_DELAYS_MS.map(allpass),
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, feedback: f32, coefficient: f32, diffuse: bool) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input, feedback, coefficient);
        }
        output *= 1.0 / self.combs.len() as f32;

        if diffuse {
            for allpass in &mut self.allpasses {
                output = allpass.process(output);
            }
        }

        output
    }

    pub fn comb_delays(&self) -> [usize; 4] {
        [
            self.combs[0].delay_samples(),
            self.combs[1].delay_samples(),
            self.combs[2].delay_samples(),
            self.combs[3].delay_samples(),
        ]
    }

    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

/// Multi-channel damped-comb reverb.
///
/// Holds no parameter state: feedback and the damping coefficient are passed
/// per sample so the caller can ramp them.
pub struct CostelloReverb {
    channels: Vec<ReverbChannel>,
    diffusion: bool,
}

impl CostelloReverb {
    /// Allocate every delay line for `sample_rate` and `channels`.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let channels = (0..channels.max(1))
            .map(|ch| ReverbChannel::new(sample_rate, ch * STEREO_SPREAD))
            .collect();

        Self {
            channels,
            diffusion: true,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    pub fn set_diffusion(&mut self, enabled: bool) {
        self.diffusion = enabled;
    }

    pub fn diffusion(&self) -> bool {
        self.diffusion
    }

    /// Comb delay lengths in samples for `channel`.
    pub fn comb_delays(&self, channel: usize) -> [usize; 4] {
        self.channels[channel].comb_delays()
    }

    /// Process a single sample of `channel`.
    #[inline]
    pub fn process(&mut self, channel: usize, input: f32, feedback: f32, coefficient: f32) -> f32 {
        let diffuse = self.diffusion;
        self.channels[channel].process(input, feedback, coefficient, diffuse)
    }

    /// Silence every delay line and filter (no allocation).
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);

        let out = comb.process(1.0, 0.5, 0.0);
        assert_eq!(out, 0.0);

        for _ in 0..9 {
            comb.process(0.0, 0.5, 0.0);
        }

        let echo = comb.process(0.0, 0.5, 0.0);
        assert_eq!(echo, 1.0);

        for _ in 0..9 {
            comb.process(0.0, 0.5, 0.0);
        }
        let second = comb.process(0.0, 0.5, 0.0);
        assert!((second - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_feedback_comb_is_pure_delay() {
        let mut comb = CombFilter::new(7);
        let input: Vec<f32> = (0..64).map(|i| ((i * 37) % 11) as f32 - 5.0).collect();

        for (n, &x) in input.iter().enumerate() {
            let y = comb.process(x, 0.0, lowpass_coefficient(4_000.0, SR));
            let expected = if n >= 7 { input[n - 7] } else { 0.0 };
            assert_eq!(y, expected, "sample {n}");
        }
    }

    #[test]
    fn test_zero_feedback_reverb_is_sum_of_delays() {
        let mut reverb = CostelloReverb::new(SR, 1);
        reverb.set_diffusion(false);
        let delays = reverb.comb_delays(0);
        let longest = *delays.iter().max().unwrap();
        let coefficient = lowpass_coefficient(4_000.0, SR);

        let output: Vec<f32> = (0..=longest)
            .map(|n| {
                let x = if n == 0 { 1.0 } else { 0.0 };
                reverb.process(0, x, 0.0, coefficient)
            })
            .collect();

        for (n, &y) in output.iter().enumerate() {
            let expected = if delays.contains(&n) { 0.25 } else { 0.0 };
            assert_eq!(y, expected, "sample {n}");
        }
    }

    #[test]
    fn test_damping_darkens_feedback() {
        // The second echo through a dark loop is weaker than through a bright one.
        let second_echo = |cutoff: f32| {
            let mut comb = CombFilter::new(32);
            let a = lowpass_coefficient(cutoff, SR);
            comb.process(1.0, 0.9, a);
            let mut peak = 0.0f32;
            for n in 1..96 {
                let y = comb.process(0.0, 0.9, a);
                if n > 32 {
                    peak = peak.max(y.abs());
                }
            }
            peak
        };

        assert!(second_echo(200.0) < second_echo(20_000.0));
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut allpass = AllpassFilter::new(5, ALLPASS_GAIN);

        let mut energy_in = 0.0;
        let mut energy_out = 0.0;
        for i in 0..200 {
            let input = if i < 10 { 1.0 } else { 0.0 };
            let output = allpass.process(input);
            energy_in += input * input;
            energy_out += output * output;
        }

        assert!(energy_out > energy_in * 0.8);
    }

    #[test]
    fn test_reverb_produces_tail() {
        let mut reverb = CostelloReverb::new(SR, 2);
        let a = lowpass_coefficient(4_000.0, SR);

        reverb.process(0, 1.0, 0.6, a);
        let mut has_tail = false;
        for _ in 0..5_000 {
            if reverb.process(0, 0.0, 0.6, a).abs() > 0.001 {
                has_tail = true;
                break;
            }
        }

        assert!(has_tail, "Reverb should produce a tail after impulse");
    }

    #[test]
    fn test_reverb_stability_at_max_feedback() {
        let mut reverb = CostelloReverb::new(SR, 1);
        let a = lowpass_coefficient(20_000.0, SR);

        for _ in 0..48_000 {
            let out = reverb.process(0, 0.1, 0.999, a);
            assert!(out.is_finite(), "Reverb output should be finite");
            assert!(out.abs() < 200.0, "Reverb output unstable: {out}");
        }
    }

    #[test]
    fn test_channels_are_decorrelated() {
        let reverb = CostelloReverb::new(SR, 2);
        let left = reverb.comb_delays(0);
        let right = reverb.comb_delays(1);
        for (l, r) in left.iter().zip(right.iter()) {
            assert_eq!(r - l, STEREO_SPREAD);
        }
    }

    #[test]
    fn test_reset_silences() {
        let mut reverb = CostelloReverb::new(SR, 1);
        let a = lowpass_coefficient(4_000.0, SR);
        for _ in 0..4_000 {
            reverb.process(0, 0.5, 0.8, a);
        }

        reverb.reset();
        for _ in 0..4_000 {
            assert_eq!(reverb.process(0, 0.0, 0.8, a), 0.0);
        }
    }
}
