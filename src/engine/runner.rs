use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    config::EngineConfig,
    engine::{
        backend::{AudioBackend, OutputStream, RenderCallback},
        renderer::ChainRenderer,
        EngineShared, RunState, StatsSnapshot,
    },
    error::{ChainError, Result},
};

/// Owns a chain and the output it plays through.
///
/// `start` and `stop` take `&mut self`, so lifecycle calls are serialised by
/// whoever owns the runner. Parameter changes go through
/// [`ChainControls`](crate::engine::ChainControls) and never need the runner.
pub struct AudioGraphRunner {
    config: EngineConfig,
    backend: Box<dyn AudioBackend>,
    renderer: Arc<Mutex<ChainRenderer>>,
    shared: Arc<EngineShared>,
    stream: Option<Box<dyn OutputStream>>,
}

impl AudioGraphRunner {
    pub fn new<B: AudioBackend + 'static>(
        config: EngineConfig,
        renderer: ChainRenderer,
        backend: B,
    ) -> Self {
        Self {
            config,
            backend: Box::new(backend),
            renderer: Arc::new(Mutex::new(renderer)),
            shared: Arc::new(EngineShared::default()),
            stream: None,
        }
    }

    /// Open the output and begin rendering.
    ///
    /// The chain is reset first, so every start plays from the top of the
    /// source with empty reverb tails. Starting a running runner is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.shared.state() == RunState::Running {
            return Ok(());
        }

        self.config.validate()?;
        self.shared.set_state(RunState::Starting);
        self.renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();

        let callback = RenderCallback::new(
            self.config,
            Arc::clone(&self.renderer),
            Arc::clone(&self.shared),
        );

        match self.backend.open(&self.config, callback) {
            Ok(stream) => {
                tracing::info!(stream = %stream.describe(), "audio started");
                self.stream = Some(stream);
                self.shared.set_state(RunState::Running);
                Ok(())
            }
            Err(err) => {
                self.shared.set_state(RunState::Stopped);
                tracing::warn!(%err, "failed to start audio");
                Err(match err {
                    ChainError::DeviceUnavailable(_) => err,
                    other => ChainError::DeviceUnavailable(other.to_string()),
                })
            }
        }
    }

    /// Halt rendering and release the output. Stopping a stopped runner is
    /// a no-op.
    pub fn stop(&mut self) -> Result<()> {
        self.shared.set_state(RunState::Stopped);
        if let Some(stream) = self.stream.take() {
            tracing::info!(stream = %stream.describe(), "audio stopped");
            drop(stream);
        }
        Ok(())
    }

    pub fn state(&self) -> RunState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats().snapshot()
    }

    pub fn shared(&self) -> &Arc<EngineShared> {
        &self.shared
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Drop for AudioGraphRunner {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
