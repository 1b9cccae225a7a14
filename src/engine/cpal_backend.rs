//! Output through the default `cpal` host device.

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig,
};

use crate::{
    config::EngineConfig,
    engine::backend::{AudioBackend, OutputStream, RenderCallback},
    error::{ChainError, Result},
    MAX_BLOCK_SIZE,
};

fn unavailable(context: &str, err: impl std::fmt::Display) -> ChainError {
    ChainError::DeviceUnavailable(format!("{context}: {err}"))
}

/// Opens the host's default output device.
#[derive(Debug, Default)]
pub struct CpalBackend;

impl CpalBackend {
    pub fn new() -> Self {
        Self
    }

    /// An [`EngineConfig`] matching the default device's sample rate and
    /// channel count, with the given block size.
    pub fn default_config(block_size: usize) -> Result<EngineConfig> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or_else(|| ChainError::DeviceUnavailable("no default output device".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| unavailable("failed to fetch default output config", e))?;

        Ok(EngineConfig::new(
            supported.sample_rate().0 as f32,
            block_size,
            supported.channels() as usize,
        ))
    }
}

impl AudioBackend for CpalBackend {
    fn open(
        &mut self,
        config: &EngineConfig,
        callback: RenderCallback,
    ) -> Result<Box<dyn OutputStream>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| ChainError::DeviceUnavailable("no default output device".into()))?;
        let name = device.name().unwrap_or_else(|_| "unknown".into());
        let sample_format = device
            .default_output_config()
            .map_err(|e| unavailable("failed to fetch default output config", e))?
            .sample_format();

        let stream_config = StreamConfig {
            channels: config.channels as u16,
            sample_rate: SampleRate(config.sample_rate as u32),
            buffer_size: cpal::BufferSize::Default,
        };

        tracing::info!(
            device = %name,
            host = ?host.id(),
            ?sample_format,
            sample_rate = config.sample_rate,
            channels = config.channels,
            "opening output stream"
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream(&device, &stream_config, callback, render_f32),
            SampleFormat::I16 => {
                build_stream(&device, &stream_config, callback, render_converted::<i16>)
            }
            SampleFormat::U16 => {
                build_stream(&device, &stream_config, callback, render_converted::<u16>)
            }
            other => Err(ChainError::DeviceUnavailable(format!(
                "unsupported sample format {other:?}"
            ))),
        }?;

        stream
            .play()
            .map_err(|e| unavailable("failed to start output stream", e))?;

        Ok(Box::new(CpalStream { stream, name }))
    }
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut callback: RenderCallback,
    mut fill: F,
) -> Result<Stream>
where
    T: SizedSample,
    F: FnMut(&mut RenderCallback, &mut [T], &mut [f32]) + Send + 'static,
{
    let channels = config.channels as usize;
    let shared = callback.shared().clone();
    let mut scratch = vec![0.0f32; MAX_BLOCK_SIZE * channels];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                fill(&mut callback, data, &mut scratch);
            },
            move |err| {
                shared.stats().add_stream_error();
                tracing::error!(%err, "output stream error");
            },
            None,
        )
        .map_err(|e| unavailable("failed to build output stream", e))
}

/// f32 devices are rendered in place.
fn render_f32(callback: &mut RenderCallback, data: &mut [f32], _scratch: &mut [f32]) {
    callback.render(data);
}

/// Other formats render through `scratch` and convert.
fn render_converted<T: FromSample<f32>>(
    callback: &mut RenderCallback,
    data: &mut [T],
    scratch: &mut [f32],
) {
    callback.render_converted(data, scratch, <T as FromSample<f32>>::from_sample_);
}

struct CpalStream {
    stream: Stream,
    name: String,
}

impl OutputStream for CpalStream {
    fn describe(&self) -> String {
        format!("cpal output on '{}'", self.name)
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            tracing::warn!(%err, "failed to pause output stream");
        }
    }
}
