use crate::{
    config::EngineConfig,
    graph::{block::AudioBlock, node::Processor, pipeline::Pipeline},
    io::{source::SampleSource, tap::TapWriter},
};

/// Everything the audio thread touches: source, stages, scratch block.
///
/// Built once, then owned by the runner and borrowed by device callbacks.
pub struct ChainRenderer {
    config: EngineConfig,
    source: Box<dyn SampleSource>,
    pipeline: Pipeline,
    block: AudioBlock,
    source_tap: Option<TapWriter>,
}

impl ChainRenderer {
    pub fn new(config: EngineConfig, source: Box<dyn SampleSource>, pipeline: Pipeline) -> Self {
        Self {
            block: AudioBlock::new(config.channels, config.block_size),
            config,
            source,
            pipeline,
            source_tap: None,
        }
    }

    /// Send every source block (the dry signal) to `tap`.
    pub fn with_source_tap(mut self, tap: TapWriter) -> Self {
        self.source_tap = Some(tap);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pull one block of `frames` frames through the chain.
    pub fn render_block(&mut self, frames: usize) -> &AudioBlock {
        self.block.set_frames(frames.min(self.config.block_size));
        self.source.fill(&mut self.block);
        if let Some(tap) = self.source_tap.as_mut() {
            tap.push_block(&self.block);
        }
        self.pipeline.process(&mut self.block);
        &self.block
    }

    /// Fill an interleaved device buffer, splitting it into blocks.
    ///
    /// Returns the number of blocks rendered. Trailing samples that do not
    /// make up a whole frame are silenced.
    pub fn render_interleaved(&mut self, out: &mut [f32]) -> usize {
        let channels = self.config.channels;
        let total_frames = out.len() / channels;
        let mut frames_written = 0;
        let mut blocks = 0;

        while frames_written < total_frames {
            let frames = (total_frames - frames_written).min(self.config.block_size);
            self.render_block(frames);

            let start = frames_written * channels;
            self.block
                .write_interleaved(&mut out[start..start + frames * channels]);

            frames_written += frames;
            blocks += 1;
        }

        out[total_frames * channels..].fill(0.0);
        blocks
    }

    /// Rewind the source and silence every stage. Control thread only.
    pub fn reset(&mut self) {
        self.source.reset();
        self.pipeline.reset();
        self.block.silence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{source::LoopingBuffer, tap::tap};

    fn renderer(block_size: usize, channels: usize) -> ChainRenderer {
        let config = EngineConfig::new(48_000.0, block_size, channels);
        let source = LoopingBuffer::from_channels(vec![vec![0.1, 0.2, 0.3, 0.4]]).unwrap();
        ChainRenderer::new(config, Box::new(source), Pipeline::new())
    }

    #[test]
    fn test_splits_device_buffer_into_blocks() {
        let mut r = renderer(3, 2);
        let mut out = [0.0f32; 14]; // 7 frames
        assert_eq!(r.render_interleaved(&mut out), 3);
        assert_eq!(
            out,
            [0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4, 0.1, 0.1, 0.2, 0.2, 0.3, 0.3]
        );
    }

    #[test]
    fn test_partial_frame_is_silenced() {
        let mut r = renderer(8, 2);
        let mut out = [9.0f32; 5];
        r.render_interleaved(&mut out);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn test_source_tap_and_reset() {
        let (writer, mut reader) = tap(32, 4, 1);
        let mut r = renderer(4, 1).with_source_tap(writer);
        r.render_block(2);
        r.reset();
        r.render_block(2);

        reader.poll();
        assert_eq!(reader.snapshot(), &[0.1, 0.2, 0.1, 0.2]);
    }
}
