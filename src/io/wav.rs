//! WAV import/export via `hound`.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{ChainError, Result};

fn source_error(path: &Path, err: hound::Error) -> ChainError {
    ChainError::Source(format!("{}: {err}", path.display()))
}

/// Decode a WAV file to interleaved `f32` in -1.0..=1.0.
pub fn read(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let mut reader = WavReader::open(path).map_err(|e| source_error(path, e))?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>(),
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| source_error(path, e))?;

    Ok((samples, spec))
}

/// Write interleaved `f32` samples as a 32-bit float WAV.
pub fn write(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| source_error(path, e))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| source_error(path, e))?;
    }
    writer.finalize().map_err(|e| source_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_wav_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loop.wav");
        let samples = [0.0, 0.5, -0.5, 1.0, -1.0, 0.25];

        write(&path, &samples, 44_100, 2).unwrap();
        let (read_back, spec) = read(&path).unwrap();

        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(read_back, samples);
    }

    #[test]
    fn test_int_wav_is_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("int.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0i16, 16_384, -32_768] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, _) = read(&path).unwrap();
        assert_eq!(samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let err = read(Path::new("/definitely/not/here.wav")).unwrap_err();
        assert!(matches!(err, ChainError::Source(_)));
    }
}
