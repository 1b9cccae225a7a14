use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use crate::{
    config::EngineConfig,
    engine::{renderer::ChainRenderer, EngineShared, RunState},
    error::{ChainError, Result},
};

/// The per-callback entry point handed to a backend.
///
/// `render` is what the device thread calls. It never blocks: the renderer is
/// taken with `try_lock`, and if the control thread happens to hold it the
/// callback writes silence and counts a dropped block.
pub struct RenderCallback {
    config: EngineConfig,
    renderer: Arc<Mutex<ChainRenderer>>,
    shared: Arc<EngineShared>,
}

impl RenderCallback {
    pub(crate) fn new(
        config: EngineConfig,
        renderer: Arc<Mutex<ChainRenderer>>,
        shared: Arc<EngineShared>,
    ) -> Self {
        Self {
            config,
            renderer,
            shared,
        }
    }

    /// Fill an interleaved output buffer.
    pub fn render(&mut self, out: &mut [f32]) {
        let frames = out.len() / self.config.channels;
        self.run(frames, |renderer| match renderer {
            Some(renderer) => renderer.render_interleaved(out),
            None => {
                out.fill(0.0);
                0
            }
        });
    }

    /// Fill an interleaved buffer of another sample type, rendering through
    /// `scratch` and converting each sample with `convert`.
    ///
    /// The whole of `out` is one device callback: the renderer is locked
    /// once and the overrun check covers the full buffer. `scratch` should
    /// hold a whole number of frames.
    pub fn render_converted<T>(
        &mut self,
        out: &mut [T],
        scratch: &mut [f32],
        convert: impl Fn(f32) -> T,
    ) {
        let channels = self.config.channels;
        let frames = out.len() / channels;
        let chunk_len = scratch.len() - scratch.len() % channels;
        if chunk_len == 0 {
            out.iter_mut().for_each(|sample| *sample = convert(0.0));
            return;
        }

        self.run(frames, |mut renderer| {
            let mut blocks = 0;
            for chunk in out.chunks_mut(chunk_len) {
                let rendered = &mut scratch[..chunk.len()];
                match renderer.as_deref_mut() {
                    Some(renderer) => blocks += renderer.render_interleaved(rendered),
                    None => rendered.fill(0.0),
                }
                for (sample, &value) in chunk.iter_mut().zip(rendered.iter()) {
                    *sample = convert(value);
                }
            }
            blocks
        });
    }

    /// Bookkeeping shared by every callback flavour. `body` gets the renderer
    /// when the chain is running and the lock was free, and returns the
    /// number of blocks it rendered.
    fn run(&self, frames: usize, body: impl FnOnce(Option<&mut ChainRenderer>) -> usize) {
        let started = Instant::now();
        let stats = self.shared.stats();
        stats.add_callback();

        if self.shared.state() != RunState::Running {
            body(None);
            return;
        }

        match self.renderer.try_lock() {
            Ok(mut renderer) => {
                let blocks = body(Some(&mut *renderer));
                stats.add_blocks(blocks as u64);
            }
            Err(_) => {
                body(None);
                stats.add_dropped_block();
            }
        }

        if started.elapsed() > self.config.budget_for(frames) {
            stats.add_overrun();
        }
    }

    pub fn shared(&self) -> &Arc<EngineShared> {
        &self.shared
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// A running output. Dropping it halts callbacks.
pub trait OutputStream {
    /// Backend-specific description for logs.
    fn describe(&self) -> String {
        String::from("output stream")
    }
}

/// Something that can open an output and drive a [`RenderCallback`].
pub trait AudioBackend {
    /// Open the output and start calling `callback`.
    ///
    /// Fails with [`ChainError::DeviceUnavailable`] if no output can be opened.
    fn open(
        &mut self,
        config: &EngineConfig,
        callback: RenderCallback,
    ) -> Result<Box<dyn OutputStream>>;
}

type CallbackSlot = Arc<Mutex<Option<RenderCallback>>>;

/// A backend with no device behind it: callbacks happen when the caller
/// pulls them through an [`OfflineDriver`].
///
/// Used for tests and for rendering a chain to a file faster than realtime.
pub struct OfflineBackend {
    slot: Option<CallbackSlot>,
}

impl OfflineBackend {
    pub fn new() -> (Self, OfflineDriver) {
        let slot: CallbackSlot = Arc::new(Mutex::new(None));
        (
            Self {
                slot: Some(Arc::clone(&slot)),
            },
            OfflineDriver { slot },
        )
    }

    /// A backend whose device can never be opened.
    pub fn unavailable() -> Self {
        Self { slot: None }
    }
}

impl AudioBackend for OfflineBackend {
    fn open(
        &mut self,
        _config: &EngineConfig,
        callback: RenderCallback,
    ) -> Result<Box<dyn OutputStream>> {
        let slot = self
            .slot
            .as_ref()
            .ok_or_else(|| ChainError::DeviceUnavailable("offline device is unavailable".into()))?;

        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
        Ok(Box::new(OfflineStream {
            slot: Arc::clone(slot),
        }))
    }
}

struct OfflineStream {
    slot: CallbackSlot,
}

impl OutputStream for OfflineStream {
    fn describe(&self) -> String {
        String::from("offline stream")
    }
}

impl Drop for OfflineStream {
    fn drop(&mut self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Caller-side handle of an [`OfflineBackend`]: plays the device.
#[derive(Clone)]
pub struct OfflineDriver {
    slot: CallbackSlot,
}

impl OfflineDriver {
    /// Run one device callback into `out`.
    ///
    /// Returns `false` (and leaves `out` untouched) if no stream is open.
    pub fn pull(&self, out: &mut [f32]) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_mut() {
            Some(callback) => {
                callback.render(out);
                true
            }
            None => false,
        }
    }

    /// True while a stream is open.
    pub fn is_open(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
