//! Continuation dispatch onto the UI event loop.
//!
//! Casement never blocks the UI loop while it waits on a view-model. When a
//! close-permission check is still pending, the work that must run after it
//! resolves is handed to a [`Dispatcher`], which schedules it on the loop the
//! application is driving.
//!
//! # Example
//!
//! ```no_run
//! use casement_core::dispatch::{Dispatcher, TokioDispatcher};
//! use futures_util::FutureExt;
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let dispatcher = TokioDispatcher::with_handle(runtime.handle().clone());
//!
//! dispatcher.spawn(async { println!("resumed on the UI loop") }.boxed());
//! ```

use futures_util::future::BoxFuture;

/// Schedules continuations on the UI event loop.
///
/// Implementations must run spawned tasks on the same loop that delivers
/// window events, so continuations never race with event handlers.
pub trait Dispatcher: Send + Sync {
    /// Schedule a task to run to completion on the event loop.
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

#[cfg(feature = "tokio")]
pub use self::tokio_dispatcher::TokioDispatcher;

#[cfg(feature = "tokio")]
mod tokio_dispatcher {
    use futures_util::future::BoxFuture;
    use tokio::runtime::{Handle, RuntimeFlavor};

    use super::Dispatcher;
    use crate::logging::targets;

    /// A [`Dispatcher`] backed by a Tokio runtime.
    ///
    /// Use a current-thread runtime (or a `LocalSet`-driven loop) to get the
    /// single-threaded cooperative scheduling Casement expects.
    ///
    /// Without an explicit handle the dispatcher spawns onto whichever runtime
    /// is current at spawn time. If no runtime is available the task is driven
    /// to completion immediately on the calling thread.
    #[derive(Debug, Clone, Default)]
    pub struct TokioDispatcher {
        handle: Option<Handle>,
    }

    impl TokioDispatcher {
        /// Create a dispatcher that uses the runtime current at spawn time.
        pub fn new() -> Self {
            Self { handle: None }
        }

        /// Create a dispatcher bound to a specific runtime.
        pub fn with_handle(handle: Handle) -> Self {
            note_flavor(&handle);
            Self {
                handle: Some(handle),
            }
        }

        /// Create a dispatcher bound to the runtime current right now.
        ///
        /// Outside a runtime this behaves like [`TokioDispatcher::new`].
        pub fn current() -> Self {
            match Handle::try_current() {
                Ok(handle) => Self::with_handle(handle),
                Err(_) => Self::new(),
            }
        }
    }

    /// Continuations on a multi-thread runtime may run alongside window
    /// event handlers.
    fn note_flavor(handle: &Handle) {
        if handle.runtime_flavor() == RuntimeFlavor::MultiThread {
            tracing::debug!(
                target: targets::DISPATCH,
                "dispatcher bound to a multi-thread runtime; continuations may run off the UI thread"
            );
        }
    }

    impl Dispatcher for TokioDispatcher {
        fn spawn(&self, task: BoxFuture<'static, ()>) {
            let handle = self.handle.clone().or_else(|| Handle::try_current().ok());
            match handle {
                Some(handle) => {
                    tracing::trace!(target: targets::DISPATCH, "spawning continuation on runtime");
                    handle.spawn(task);
                }
                None => {
                    // No event loop available - drive the task right here.
                    // This can happen during testing or early initialization.
                    tracing::warn!(
                        target: targets::DISPATCH,
                        "No async runtime available for continuation, executing immediately"
                    );
                    pollster::block_on(task);
                }
            }
        }
    }

    static_assertions::assert_impl_all!(TokioDispatcher: Send, Sync);
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures_util::FutureExt;

    use super::*;

    #[test]
    fn test_spawn_without_runtime_runs_immediately() {
        let dispatcher = TokioDispatcher::new();
        let ran = Arc::new(AtomicBool::new(false));

        let ran_clone = ran.clone();
        dispatcher.spawn(
            async move {
                ran_clone.store(true, Ordering::SeqCst);
            }
            .boxed(),
        );

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_spawn_on_current_runtime_defers() {
        let dispatcher = TokioDispatcher::current();

        let (tx, rx) = tokio::sync::oneshot::channel();
        dispatcher.spawn(
            async move {
                let _ = tx.send(7);
            }
            .boxed(),
        );

        assert_eq!(rx.await.unwrap(), 7);
    }

    #[test]
    fn test_spawn_with_explicit_handle() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let dispatcher = TokioDispatcher::with_handle(runtime.handle().clone());

        let (tx, rx) = tokio::sync::oneshot::channel();
        dispatcher.spawn(
            async move {
                let _ = tx.send("done");
            }
            .boxed(),
        );

        assert_eq!(runtime.block_on(rx).unwrap(), "done");
    }
}
