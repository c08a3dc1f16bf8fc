//! The runtime host: task spawning and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

/// Handle to the scheduler that runs scope tasks.
///
/// The engine is agnostic to whether the underlying runtime is single- or
/// multi-threaded; it only needs `launch`. A scope must not outlive the host
/// that owns its tasks, which callers get for free by keeping the tokio
/// runtime alive for the duration of every scope.
#[derive(Clone)]
pub struct RuntimeHost {
    handle: tokio::runtime::Handle,
}

impl RuntimeHost {
    /// Bind to the runtime of the calling context.
    ///
    /// # Panics
    /// Panics outside a tokio runtime, matching `Handle::current`.
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }

    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Schedule a body. The caller keeps the handle; the host hands out no
    /// ordering guarantees between launched bodies.
    pub fn launch<F>(&self, body: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(body)
    }

    /// Mint a fresh cooperative cancellation flag.
    pub fn cancel_flag(&self) -> CancelFlag {
        CancelFlag::default()
    }
}

impl std::fmt::Debug for RuntimeHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHost").finish_non_exhaustive()
    }
}

/// Best-effort cancellation: tasks observe it only by polling.
#[derive(Clone, Default)]
pub struct CancelFlag {
    flag: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for CancelFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelFlag")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
