//! Thread bridge between synchronous callers and async work
//!
//! [`ThreadBridge::detach`] starts a named OS thread that owns a
//! single-threaded tokio runtime, drives the unit of work to completion and
//! discards its result. [`ThreadBridge::block_on`] is the synchronous adapter
//! used for direct client calls: it also builds its own scheduler instead of
//! assuming one is already running.

use std::future::Future;
use std::thread::JoinHandle;

use dingbridge_domain::{DingBridgeError, Result};
use tokio::runtime::{Builder as RuntimeBuilder, Handle, Runtime};
use tracing::{debug, error};

/// Spawns detached execution units and runs futures from sync code
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadBridge;

impl ThreadBridge {
    pub fn new() -> Self {
        Self
    }

    /// Run `work` on a new thread with its own current-thread runtime.
    ///
    /// Returns as soon as the thread is spawned. The future is constructed on
    /// the new thread, so it does not need to be `Send`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the OS refuses to spawn the thread.
    pub fn detach<F, Fut>(&self, name: impl Into<String>, work: F) -> Result<DetachedHandle>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let name = name.into();
        let thread_name = name.clone();

        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let runtime = match current_thread_runtime() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(error = %err, "detached unit could not build its runtime");
                        return;
                    }
                };
                runtime.block_on(work());
            })
            .map_err(|err| {
                DingBridgeError::Internal(format!("failed to spawn thread {name}: {err}"))
            })?;

        debug!(thread = %name, "detached unit started");
        Ok(DetachedHandle { inner: handle })
    }

    /// Drive `future` to completion on a fresh current-thread runtime.
    ///
    /// When called from inside a tokio runtime the future runs on a scoped
    /// helper thread, since runtimes cannot be nested on one thread.
    pub fn block_on<Fut>(&self, future: Fut) -> Result<Fut::Output>
    where
        Fut: Future + Send,
        Fut::Output: Send,
    {
        if Handle::try_current().is_err() {
            return Ok(current_thread_runtime()?.block_on(future));
        }

        std::thread::scope(|scope| {
            scope
                .spawn(|| current_thread_runtime().map(|runtime| runtime.block_on(future)))
                .join()
                .map_err(|_| DingBridgeError::Internal("blocking call panicked".into()))?
        })
    }
}

/// Handle to a detached unit. Dropping it leaves the unit running.
#[derive(Debug)]
pub struct DetachedHandle {
    inner: JoinHandle<()>,
}

impl DetachedHandle {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Block until the unit exits.
    pub fn join(self) -> Result<()> {
        self.inner
            .join()
            .map_err(|_| DingBridgeError::Internal("detached unit panicked".into()))
    }
}

fn current_thread_runtime() -> Result<Runtime> {
    RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| DingBridgeError::Internal(format!("failed to build tokio runtime: {err}")))
}
