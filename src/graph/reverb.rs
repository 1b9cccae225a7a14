use crate::{
    dsp::reverb::{lowpass_coefficient, CostelloReverb},
    graph::{block::AudioBlock, node::Processor},
    param::ParamRamp,
};

/*
Reverb Node
===========

Runs the damped comb network over a block, reading feedback and damping
cutoff from their ramps once per sample. The output is 100% wet: blending
with the dry signal is the DryWetNode's job.

Per-sample ramping
------------------

Both ramps advance once per frame, and every channel of that frame sees the
same values. The low-pass coefficient costs an `exp()`, so it is only
recomputed on frames where the cutoff actually moved:

  cutoff ramp idle    →  cached coefficient, no exp()
  cutoff ramp moving  →  new coefficient every sample (no zipper steps)

Example usage:

  let (feedback, feedback_ramp) = param(FEEDBACK, 0.6, 48_000.0);
  let (cutoff, cutoff_ramp) = param(CUTOFF, 4_000.0, 48_000.0);
  let node = ReverbNode::new(48_000.0, 2, feedback_ramp, cutoff_ramp);

  // any thread, any time:
  feedback.set_target(0.9, 0.02)?;
*/

/// Wet-only reverb stage driven by ramped feedback and cutoff.
pub struct ReverbNode {
    reverb: CostelloReverb,
    feedback: ParamRamp,
    cutoff: ParamRamp,
    sample_rate: f32,
    coefficient: f32,
    coefficient_cutoff: f32,
}

impl ReverbNode {
    pub fn new(sample_rate: f32, channels: usize, feedback: ParamRamp, cutoff: ParamRamp) -> Self {
        let coefficient_cutoff = cutoff.current();
        Self {
            reverb: CostelloReverb::new(sample_rate, channels),
            feedback,
            cutoff,
            sample_rate,
            coefficient: lowpass_coefficient(coefficient_cutoff, sample_rate),
            coefficient_cutoff,
        }
    }

    /// Enable or bypass the allpass diffusers.
    pub fn set_diffusion(&mut self, enabled: bool) {
        self.reverb.set_diffusion(enabled);
    }

    pub fn reverb(&self) -> &CostelloReverb {
        &self.reverb
    }

    #[inline]
    fn coefficient_for(&mut self, cutoff: f32) -> f32 {
        if cutoff != self.coefficient_cutoff {
            self.coefficient_cutoff = cutoff;
            self.coefficient = lowpass_coefficient(cutoff, self.sample_rate);
        }
        self.coefficient
    }
}

impl Processor for ReverbNode {
    fn process(&mut self, block: &mut AudioBlock) {
        self.feedback.poll();
        self.cutoff.poll();

        let channels = block.channels().min(self.reverb.channels());
        for frame in 0..block.frames() {
            let feedback = self.feedback.advance();
            let cutoff = self.cutoff.advance();
            let coefficient = self.coefficient_for(cutoff);

            for ch in 0..channels {
                let dry = block.sample(ch, frame);
                let wet = self.reverb.process(ch, dry, feedback, coefficient);
                block.set_sample(ch, frame, wet);
            }
        }

        self.feedback.publish();
        self.cutoff.publish();
    }

    fn reset(&mut self) {
        self.reverb.reset();
        self.feedback.settle();
        self.cutoff.settle();
        let cutoff = self.cutoff.current();
        self.coefficient_for(cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{param, CUTOFF, FEEDBACK};

    const SR: f32 = 48_000.0;

    fn node(feedback: f32, cutoff: f32) -> (ReverbNode, crate::param::ParamHandle) {
        let (fb_handle, fb) = param(FEEDBACK, feedback, SR);
        let (_cutoff_handle, co) = param(CUTOFF, cutoff, SR);
        (ReverbNode::new(SR, 1, fb, co), fb_handle)
    }

    #[test]
    fn test_reverb_adds_tail() {
        let (mut reverb, _) = node(0.6, 4_000.0);

        let mut block = AudioBlock::new(1, 64);
        block.channel_mut(0)[0] = 1.0;
        reverb.process(&mut block);

        let mut tail_energy = 0.0;
        for _ in 0..200 {
            block.silence();
            reverb.process(&mut block);
            tail_energy += block.channel(0).iter().map(|x| x * x).sum::<f32>();
        }

        assert!(tail_energy > 0.01, "Reverb should produce a tail");
    }

    #[test]
    fn test_zero_feedback_without_diffusion_is_pure_delay() {
        let (mut reverb, _) = node(0.0, 4_000.0);
        reverb.set_diffusion(false);
        let delays = reverb.reverb().comb_delays(0);

        let block_size = 128;
        let total = 2_304; // > longest delay at 48 kHz
        let input: Vec<f32> = (0..total).map(|n| ((n * 7919) % 13) as f32 / 13.0).collect();
        let mut output = Vec::with_capacity(total);

        let mut block = AudioBlock::new(1, block_size);
        for chunk in input.chunks(block_size) {
            block.set_frames(chunk.len());
            block.channel_mut(0).copy_from_slice(chunk);
            reverb.process(&mut block);
            output.extend_from_slice(block.channel(0));
        }

        for n in 0..total {
            let expected: f32 = delays
                .iter()
                .map(|&d| if n >= d { input[n - d] } else { 0.0 })
                .sum::<f32>()
                * 0.25;
            assert!(
                (output[n] - expected).abs() < 1e-6,
                "sample {n}: {} != {expected}",
                output[n]
            );
        }
    }

    #[test]
    fn test_feedback_ramp_is_published() {
        let (mut reverb, feedback) = node(0.2, 4_000.0);
        feedback.set_target(0.8, 0.0).unwrap();

        let mut block = AudioBlock::new(1, 32);
        reverb.process(&mut block);
        assert_eq!(feedback.current(), 0.8);
    }

    #[test]
    fn test_reset_silences_and_settles() {
        let (mut reverb, feedback) = node(0.9, 8_000.0);
        let mut block = AudioBlock::new(1, 256);
        for _ in 0..20 {
            block.channel_mut(0).fill(0.5);
            reverb.process(&mut block);
        }
        feedback.set_target(0.1, 10.0).unwrap();

        reverb.reset();
        assert_eq!(feedback.current(), 0.1);

        block.silence();
        reverb.process(&mut block);
        assert!(block.channel(0).iter().all(|&s| s == 0.0));
    }
}
