//! The source → reverb → dry/wet chain, wired up.
//!
//! ```text
//! source ──(dry tap)──┬─────────────────────────────┐
//!                     └──→ ReverbNode ──(wet tap)──→ DryWetNode ──(mix tap)──→ out
//!                            ▲ feedback, cutoff         ▲ balance
//!                            └──── ChainControls (any thread) ────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use saavy_reverb::{engine::*, io::LoopingBuffer, EngineConfig};
//!
//! let config = EngineConfig::default();
//! let chain = ChainBuilder::new(config)
//!     .source(LoopingBuffer::drum_loop(config.sample_rate))
//!     .build()?;
//! let ReverbChain { renderer, controls, mut taps } = chain;
//!
//! let mut runner = AudioGraphRunner::new(config, renderer, CpalBackend::new());
//! runner.start()?;
//! controls.set_feedback(0.9)?;
//! ```

use crate::{
    config::{ChainSettings, EngineConfig},
    engine::renderer::ChainRenderer,
    error::{ChainError, Result},
    graph::{dry_wet::DryWetNode, pipeline::Pipeline, reverb::ReverbNode},
    io::{
        source::{LoopingBuffer, SampleSource},
        tap::{tap, TapReader},
    },
    param::{param, ParamHandle, BALANCE, CUTOFF, FEEDBACK},
};

/// Rolling plot length in blocks.
pub const DEFAULT_PLOT_HISTORY: usize = 128;
/// Tap ring size in blocks: how far the UI may fall behind before dropping.
const TAP_RING_BLOCKS: usize = 16;

/// Builder for a [`ReverbChain`].
pub struct ChainBuilder {
    config: EngineConfig,
    settings: ChainSettings,
    source: Option<Box<dyn SampleSource>>,
    plot_history: usize,
    diffusion: bool,
}

impl ChainBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            settings: ChainSettings::default(),
            source: None,
            plot_history: DEFAULT_PLOT_HISTORY,
            diffusion: true,
        }
    }

    /// Initial parameter values. Validated by [`build`](Self::build).
    pub fn settings(mut self, settings: ChainSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Input. Defaults to the built-in drum loop.
    pub fn source<S: SampleSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Number of points each tap keeps (one point per block).
    pub fn plot_history(mut self, points: usize) -> Self {
        self.plot_history = points;
        self
    }

    /// Enable or bypass the reverb's allpass diffusers.
    pub fn diffusion(mut self, enabled: bool) -> Self {
        self.diffusion = enabled;
        self
    }

    pub fn build(self) -> Result<ReverbChain> {
        let ChainBuilder {
            config,
            settings,
            source,
            plot_history,
            diffusion,
        } = self;

        config.validate()?;
        validate_settings(&settings)?;

        let sr = config.sample_rate;
        let (feedback, feedback_ramp) = param(FEEDBACK, settings.feedback, sr);
        let (cutoff, cutoff_ramp) = param(CUTOFF, settings.cutoff_hz, sr);
        let (balance, balance_ramp) = param(BALANCE, settings.balance, sr);

        let ring = config.block_size * TAP_RING_BLOCKS;
        let (dry_writer, dry) = tap(ring, plot_history, config.block_size);
        let (wet_writer, wet) = tap(ring, plot_history, config.block_size);
        let (mix_writer, mix) = tap(ring, plot_history, config.block_size);

        let mut reverb = ReverbNode::new(sr, config.channels, feedback_ramp, cutoff_ramp);
        reverb.set_diffusion(diffusion);
        let mixer =
            DryWetNode::new(reverb, balance_ramp, config.channels).with_wet_tap(wet_writer);

        let mut pipeline = Pipeline::new();
        pipeline.push_tapped(mixer, mix_writer);

        let source =
            source.unwrap_or_else(|| Box::new(LoopingBuffer::drum_loop(config.sample_rate)));
        if let Some(source_rate) = source.sample_rate() {
            if source_rate != sr {
                return Err(ChainError::Source(format!(
                    "source is {source_rate} Hz but the chain runs at {sr} Hz"
                )));
            }
        }
        let renderer = ChainRenderer::new(config, source, pipeline).with_source_tap(dry_writer);

        tracing::info!(
            sample_rate = sr,
            block_size = config.block_size,
            channels = config.channels,
            ?settings,
            "built reverb chain"
        );

        Ok(ReverbChain {
            renderer,
            controls: ChainControls {
                feedback,
                cutoff,
                balance,
                ramp_duration: settings.ramp_duration,
            },
            taps: ChainTaps { dry, wet, mix },
        })
    }
}

fn validate_settings(settings: &ChainSettings) -> Result<()> {
    FEEDBACK.validate(settings.feedback)?;
    CUTOFF.validate(settings.cutoff_hz)?;
    BALANCE.validate(settings.balance)?;
    validate_ramp(settings.ramp_duration)
}

fn validate_ramp(duration: f32) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(ChainError::invalid(
            "ramp_duration",
            duration,
            "must be finite and non-negative",
        ));
    }
    Ok(())
}

/// A built chain, split by the thread that owns each part.
pub struct ReverbChain {
    /// Audio thread (via a runner).
    pub renderer: ChainRenderer,
    /// Control threads.
    pub controls: ChainControls,
    /// UI thread.
    pub taps: ChainTaps,
}

/// Control-thread handles for the three chain parameters.
#[derive(Clone)]
pub struct ChainControls {
    pub feedback: ParamHandle,
    pub cutoff: ParamHandle,
    pub balance: ParamHandle,
    ramp_duration: f32,
}

impl ChainControls {
    pub fn ramp_duration(&self) -> f32 {
        self.ramp_duration
    }

    pub fn set_ramp_duration(&mut self, seconds: f32) -> Result<()> {
        validate_ramp(seconds)?;
        self.ramp_duration = seconds;
        Ok(())
    }

    pub fn set_feedback(&self, value: f32) -> Result<()> {
        self.feedback.set_target(value, self.ramp_duration)
    }

    pub fn set_cutoff(&self, hz: f32) -> Result<()> {
        self.cutoff.set_target(hz, self.ramp_duration)
    }

    pub fn set_balance(&self, balance: f32) -> Result<()> {
        self.balance.set_target(balance, self.ramp_duration)
    }

    /// Apply all settings, or none of them if any is invalid.
    pub fn apply(&mut self, settings: &ChainSettings) -> Result<()> {
        validate_settings(settings)?;
        self.ramp_duration = settings.ramp_duration;
        self.set_feedback(settings.feedback)?;
        self.set_cutoff(settings.cutoff_hz)?;
        self.set_balance(settings.balance)
    }

    /// Current targets as settings.
    pub fn settings(&self) -> ChainSettings {
        ChainSettings {
            feedback: self.feedback.target(),
            cutoff_hz: self.cutoff.target(),
            balance: self.balance.target(),
            ramp_duration: self.ramp_duration,
        }
    }
}

/// UI-thread readers for the dry, wet and mixed signals.
pub struct ChainTaps {
    pub dry: TapReader,
    pub wet: TapReader,
    pub mix: TapReader,
}

impl ChainTaps {
    pub fn poll(&mut self) {
        self.dry.poll();
        self.wet.poll();
        self.mix.poll();
    }

    pub fn clear(&mut self) {
        self.dry.clear();
        self.wet.clear();
        self.mix.clear();
    }
}
