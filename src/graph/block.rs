use crate::MAX_BLOCK_SIZE;

/// A block of planar audio passed between stages within one callback.
///
/// Storage for `MAX_BLOCK_SIZE` frames per channel is allocated up front;
/// changing the frame count never allocates, so a block can be reused for the
/// lifetime of a chain.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl AudioBlock {
    pub fn new(channels: usize, frames: usize) -> Self {
        let frames = frames.min(MAX_BLOCK_SIZE);
        Self {
            channels: vec![vec![0.0; MAX_BLOCK_SIZE]; channels.max(1)],
            frames,
        }
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Resize the active region. Clamped to `MAX_BLOCK_SIZE`.
    #[inline]
    pub fn set_frames(&mut self, frames: usize) {
        self.frames = frames.min(MAX_BLOCK_SIZE);
    }

    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.channels[channel][..self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.channels[channel][..self.frames]
    }

    #[inline]
    pub fn sample(&self, channel: usize, frame: usize) -> f32 {
        self.channels[channel][frame]
    }

    #[inline]
    pub fn set_sample(&mut self, channel: usize, frame: usize, value: f32) {
        self.channels[channel][frame] = value;
    }

    /// Average of all channels at `frame`.
    #[inline]
    pub fn mono(&self, frame: usize) -> f32 {
        let sum: f32 = self.channels.iter().map(|ch| ch[frame]).sum();
        sum / self.channels.len() as f32
    }

    pub fn silence(&mut self) {
        let frames = self.frames;
        for ch in &mut self.channels {
            ch[..frames].fill(0.0);
        }
    }

    /// Copy frame count and samples from `other` (channel counts must match).
    pub fn copy_from(&mut self, other: &AudioBlock) {
        debug_assert_eq!(self.channels(), other.channels());
        self.frames = other.frames;
        for (dst, src) in self.channels.iter_mut().zip(other.channels.iter()) {
            dst[..other.frames].copy_from_slice(&src[..other.frames]);
        }
    }

    /// Interleave the active frames into `out` (`frames * channels` long).
    pub fn write_interleaved(&self, out: &mut [f32]) {
        let channels = self.channels();
        debug_assert!(out.len() >= self.frames * channels);
        for (frame, slot) in out.chunks_exact_mut(channels).take(self.frames).enumerate() {
            for (ch, s) in slot.iter_mut().enumerate() {
                *s = self.channels[ch][frame];
            }
        }
    }
}
