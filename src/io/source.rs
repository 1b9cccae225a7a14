//! Sample sources feeding the head of a chain.

use std::path::Path;

use crate::{
    error::{ChainError, Result},
    graph::block::AudioBlock,
    io::wav,
};

/// Supplies one block of input per callback. Runs on the audio thread.
pub trait SampleSource: Send {
    fn fill(&mut self, block: &mut AudioBlock);

    /// Rewind to the start.
    fn reset(&mut self) {}

    /// The rate the material was recorded at, when it has one.
    ///
    /// A chain refuses a source whose rate differs from its own, since
    /// playing it back unconverted would shift pitch and tempo.
    fn sample_rate(&self) -> Option<f32> {
        None
    }
}

/// A pre-decoded buffer played in a loop.
///
/// Source channels are mapped round-robin onto the block's channels, so a
/// mono sample plays on every output channel and a stereo one keeps its
/// left/right image on a stereo chain.
pub struct LoopingBuffer {
    channels: Vec<Vec<f32>>,
    position: usize,
    sample_rate: Option<f32>,
}

impl LoopingBuffer {
    /// Planar input. Every channel must have the same, non-zero length.
    pub fn from_channels(channels: Vec<Vec<f32>>) -> Result<Self> {
        let len = channels.first().map(Vec::len).unwrap_or(0);
        if len == 0 {
            return Err(ChainError::Source("sample buffer is empty".into()));
        }
        if channels.iter().any(|ch| ch.len() != len) {
            return Err(ChainError::Source(
                "sample channels have different lengths".into(),
            ));
        }
        Ok(Self {
            channels,
            position: 0,
            sample_rate: None,
        })
    }

    /// Interleaved input with `channels` channels.
    pub fn from_interleaved(samples: &[f32], channels: usize) -> Result<Self> {
        if channels == 0 {
            return Err(ChainError::Source("sample has zero channels".into()));
        }
        let planar = (0..channels)
            .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
            .collect();
        Self::from_channels(planar)
    }

    /// Tag the buffer with the rate it was recorded at.
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Decode a WAV file. The buffer keeps the file's sample rate.
    pub fn from_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let (samples, spec) = wav::read(path)?;
        tracing::info!(
            path = %path.display(),
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            frames = samples.len() / spec.channels.max(1) as usize,
            "loaded sample"
        );
        Ok(Self::from_interleaved(&samples, spec.channels as usize)?
            .with_sample_rate(spec.sample_rate as f32))
    }

    /// A one-bar drum loop at 120 BPM, synthesised so the chain can run
    /// without a sample file: kick on every beat, noise snare on 2 and 4,
    /// closed hats on eighths.
    pub fn drum_loop(sample_rate: f32) -> Self {
        let beat = (sample_rate * 0.5) as usize;
        let len = beat * 4;
        let mut out = vec![0.0f32; len];
        let mut noise = 0x1234_5678u32;
        let mut next_noise = move || {
            // xorshift32
            noise ^= noise << 13;
            noise ^= noise >> 17;
            noise ^= noise << 5;
            (noise as f32 / u32::MAX as f32) * 2.0 - 1.0
        };

        for (i, sample) in out.iter_mut().enumerate() {
            let in_beat = i % beat;
            let t = in_beat as f32 / sample_rate;
            let beat_index = i / beat;

            // Kick: pitch-dropping sine
            let kick_freq = 50.0 + 100.0 * (-t * 30.0).exp();
            let kick = (std::f32::consts::TAU * kick_freq * t).sin() * (-t * 8.0).exp();

            let n = next_noise();
            let snare = if beat_index % 2 == 1 {
                n * (-t * 20.0).exp() * 0.5
            } else {
                0.0
            };

            let t_eighth = (i % (beat / 2)) as f32 / sample_rate;
            let hat = n * (-t_eighth * 80.0).exp() * 0.15;

            *sample = (kick * 0.8 + snare + hat).clamp(-1.0, 1.0);
        }

        Self {
            channels: vec![out],
            position: 0,
            sample_rate: Some(sample_rate),
        }
    }

    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }
}

impl SampleSource for LoopingBuffer {
    fn fill(&mut self, block: &mut AudioBlock) {
        let len = self.len();
        let source_channels = self.channels.len();
        for frame in 0..block.frames() {
            for ch in 0..block.channels() {
                let sample = self.channels[ch % source_channels][self.position];
                block.set_sample(ch, frame, sample);
            }
            self.position += 1;
            if self.position == len {
                self.position = 0;
            }
        }
    }

    fn reset(&mut self) {
        self.position = 0;
    }

    fn sample_rate(&self) -> Option<f32> {
        self.sample_rate
    }
}
