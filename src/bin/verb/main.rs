//! verb - a reverb with a dry/wet knob, in the terminal
//!
//! Run with: cargo run --bin verb -- [--sample loop.wav]

mod app;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use saavy_reverb::{
    engine::{AudioGraphRunner, ChainBuilder, CpalBackend, OfflineBackend, ReverbChain},
    io::{wav, LoopingBuffer, SampleSource},
    ChainSettings, EngineConfig,
};
use tracing_subscriber::EnvFilter;

use app::App;

const DEFAULT_BOUNCE_RATE: u32 = 48_000;

#[derive(Parser, Debug)]
#[command(name = "verb")]
#[command(about = "Damped comb reverb with ramped controls", long_about = None)]
struct Args {
    /// WAV file to loop (default: built-in drum loop)
    #[arg(short, long)]
    sample: Option<PathBuf>,

    /// Frames per processing block
    #[arg(short, long, default_value = "256")]
    block_size: usize,

    /// Comb feedback, 0.0-0.999
    #[arg(short, long, default_value = "0.6")]
    feedback: f32,

    /// Damping low-pass cutoff in Hz
    #[arg(short, long, default_value = "4000")]
    cutoff: f32,

    /// Dry/wet balance, 0.0 (dry) to 1.0 (wet)
    #[arg(long, default_value = "0.5")]
    balance: f32,

    /// Ramp duration in seconds for every parameter change
    #[arg(short, long, default_value = "0.02")]
    ramp: f32,

    /// Render offline to this WAV file instead of playing
    #[arg(long)]
    bounce: Option<PathBuf>,

    /// Length of an offline render in seconds
    #[arg(long, default_value = "8.0")]
    seconds: f32,

    /// Sample rate for offline renders (default: the sample's rate, or 48000)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Log file used while the terminal UI is running
    #[arg(long, default_value = "verb.log")]
    log_file: PathBuf,
}

impl Args {
    fn settings(&self) -> ChainSettings {
        ChainSettings {
            feedback: self.feedback,
            cutoff_hz: self.cutoff,
            balance: self.balance,
            ramp_duration: self.ramp,
        }
    }

    fn load_sample(&self) -> EyreResult<Option<LoopingBuffer>> {
        self.sample
            .as_ref()
            .map(|path| {
                LoopingBuffer::from_wav(path)
                    .wrap_err_with(|| format!("failed to load {}", path.display()))
            })
            .transpose()
    }

    fn build_chain(
        &self,
        config: EngineConfig,
        sample: Option<LoopingBuffer>,
    ) -> EyreResult<ReverbChain> {
        let mut builder = ChainBuilder::new(config).settings(self.settings());
        if let Some(source) = sample {
            builder = builder.source(source);
        }
        builder.build().wrap_err("failed to build reverb chain")
    }

    /// Offline render rate: `--sample-rate`, else the sample's own rate.
    fn bounce_rate(&self, sample: Option<&LoopingBuffer>) -> u32 {
        self.sample_rate
            .or_else(|| sample.and_then(SampleSource::sample_rate).map(|sr| sr as u32))
            .unwrap_or(DEFAULT_BOUNCE_RATE)
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    match &args.bounce {
        Some(out) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            bounce(&args, out)
        }
        None => {
            // The terminal belongs to the UI, so logs go to a file.
            let log = File::create(&args.log_file)
                .wrap_err_with(|| format!("failed to create {}", args.log_file.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Mutex::new(log))
                .with_ansi(false)
                .init();
            play(&args)
        }
    }
}

fn play(args: &Args) -> EyreResult<()> {
    let config = CpalBackend::default_config(args.block_size)?;
    let ReverbChain {
        renderer,
        controls,
        taps,
    } = args.build_chain(config, args.load_sample()?)?;
    let runner = AudioGraphRunner::new(config, renderer, CpalBackend::new());

    let mut app = App::new(runner, controls, taps);
    let terminal = ratatui::init();
    let res = app.run(terminal);
    ratatui::restore();
    res
}

/// Render `args.seconds` of the chain to a stereo WAV file.
fn bounce(args: &Args, out: &Path) -> EyreResult<()> {
    let sample = args.load_sample()?;
    let sample_rate = args.bounce_rate(sample.as_ref());
    let config = EngineConfig::new(sample_rate as f32, args.block_size, 2);
    let ReverbChain { renderer, .. } = args.build_chain(config, sample)?;

    let (backend, driver) = OfflineBackend::new();
    let mut runner = AudioGraphRunner::new(config, renderer, backend);
    runner.start()?;

    let total_frames = (args.seconds.max(0.0) * config.sample_rate) as usize;
    let mut samples = Vec::with_capacity(total_frames * config.channels);
    let mut buffer = vec![0.0f32; config.block_size * config.channels];

    while samples.len() < total_frames * config.channels {
        if !driver.pull(&mut buffer) {
            return Err(eyre!("offline stream closed early"));
        }
        samples.extend_from_slice(&buffer);
    }
    samples.truncate(total_frames * config.channels);
    runner.stop()?;

    wav::write(out, &samples, sample_rate, config.channels as u16)?;
    tracing::info!(path = %out.display(), frames = total_frames, "bounced");
    println!("wrote {} ({:.1}s)", out.display(), args.seconds);
    Ok(())
}
