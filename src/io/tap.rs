//! Signal taps for visualisation.
//!
//! A tap copies a stage's output off the audio thread without ever blocking
//! it: the writer pushes a mono downmix into an `rtrb` ring and drops what
//! does not fit, the reader drains the ring from the UI thread into a rolling
//! history.
//!
//! The history is decimated: each point is the largest-magnitude sample of
//! `decimation` consecutive samples, which is what a rolling "peak" plot
//! wants. With `decimation == block size` one point per block comes out,
//! i.e. the history spans `history` blocks.

use rtrb::{Consumer, Producer, RingBuffer};

use crate::graph::block::AudioBlock;

/// Create a connected writer/reader pair.
///
/// - `capacity`: ring size in samples (how far the reader may fall behind)
/// - `history`: number of points the reader keeps
/// - `decimation`: samples folded into one point (at least 1)
pub fn tap(capacity: usize, history: usize, decimation: usize) -> (TapWriter, TapReader) {
    let (producer, consumer) = RingBuffer::<f32>::new(capacity.max(1));
    (
        TapWriter { producer },
        TapReader {
            consumer,
            history: vec![0.0; history],
            capacity: history,
            decimation: decimation.max(1),
            acc: 0.0,
            acc_len: 0,
        },
    )
}

/// Audio-thread end of a tap.
pub struct TapWriter {
    producer: Producer<f32>,
}

impl TapWriter {
    /// Push the block's mono downmix. Never blocks: once the ring is full
    /// the rest of the block is dropped, and the plot shows a gap.
    #[inline]
    pub fn push_block(&mut self, block: &AudioBlock) {
        for frame in 0..block.frames() {
            if self.producer.push(block.mono(frame)).is_err() {
                break;
            }
        }
    }
}

/// UI-thread end of a tap.
pub struct TapReader {
    consumer: Consumer<f32>,
    history: Vec<f32>,
    capacity: usize,
    decimation: usize,
    acc: f32,
    acc_len: usize,
}

impl TapReader {
    /// Drain everything the writer pushed since the last poll.
    ///
    /// Returns the number of new history points.
    pub fn poll(&mut self) -> usize {
        let mut added = 0;

        while let Ok(sample) = self.consumer.pop() {
            if sample.abs() >= self.acc.abs() {
                self.acc = sample;
            }
            self.acc_len += 1;
            if self.acc_len == self.decimation {
                self.history.push(self.acc);
                self.acc = 0.0;
                self.acc_len = 0;
                added += 1;
            }
        }

        if self.history.len() > self.capacity {
            let excess = self.history.len() - self.capacity;
            self.history.drain(0..excess);
        }
        added
    }

    /// Oldest-first view of the rolling history.
    pub fn snapshot(&self) -> &[f32] {
        &self.history
    }

    /// Most recent point.
    pub fn latest(&self) -> f32 {
        self.history.last().copied().unwrap_or(0.0)
    }

    /// Reset the history to silence.
    pub fn clear(&mut self) {
        while self.consumer.pop().is_ok() {}
        self.history.clear();
        self.history.resize(self.capacity, 0.0);
        self.acc = 0.0;
        self.acc_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_of(values: &[f32]) -> AudioBlock {
        let mut block = AudioBlock::new(1, values.len());
        block.channel_mut(0).copy_from_slice(values);
        block
    }

    #[test]
    fn test_history_keeps_latest_points() {
        let (mut writer, mut reader) = tap(64, 4, 1);
        assert_eq!(reader.snapshot(), &[0.0; 4]);

        writer.push_block(&block_of(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]));
        assert_eq!(reader.poll(), 6);
        assert_eq!(reader.snapshot(), &[0.3, 0.4, 0.5, 0.6]);
        assert_eq!(reader.latest(), 0.6);
    }

    #[test]
    fn test_decimation_keeps_peak_with_sign() {
        let (mut writer, mut reader) = tap(64, 2, 4);
        writer.push_block(&block_of(&[0.1, -0.9, 0.5, 0.2, 0.3, 0.1, 0.7, 0.0]));
        assert_eq!(reader.poll(), 2);
        assert_eq!(reader.snapshot(), &[-0.9, 0.7]);
    }

    #[test]
    fn test_overflow_drops_instead_of_blocking() {
        let (mut writer, mut reader) = tap(4, 8, 1);
        let values: Vec<f32> = (1..=10).map(|i| i as f32 / 10.0).collect();
        writer.push_block(&block_of(&values));
        assert_eq!(reader.poll(), 4);
        assert_eq!(&reader.snapshot()[4..], &[0.1, 0.2, 0.3, 0.4]);

        // Once drained, the writer picks up again with the next block.
        writer.push_block(&block_of(&[0.9]));
        assert_eq!(reader.poll(), 1);
        assert_eq!(reader.latest(), 0.9);
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let (mut writer, mut reader) = tap(8, 1, 1);
        let mut block = AudioBlock::new(2, 1);
        block.channel_mut(0)[0] = 1.0;
        block.channel_mut(1)[0] = 0.0;
        writer.push_block(&block);
        reader.poll();
        assert_eq!(reader.latest(), 0.5);
    }
}
