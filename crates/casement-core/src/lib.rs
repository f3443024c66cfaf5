//! Core primitives for Casement.
//!
//! This crate provides the building blocks the Casement window conductor is
//! written against:
//!
//! - **Signal/Slot System**: Type-safe notification of window and view-model events
//! - **Property System**: Values with change detection
//! - **Dispatch**: Scheduling of continuations on the UI event loop
//! - **Logging**: Tracing targets for filtering Casement's log output
//!
//! # Signal/Slot Example
//!
//! ```
//! use casement_core::Signal;
//!
//! let state_changed = Signal::<&'static str>::new();
//!
//! let conn_id = state_changed.connect(|state| {
//!     println!("Window is now {}", state);
//! });
//!
//! state_changed.emit("minimized");
//! state_changed.disconnect(conn_id);
//! ```

pub mod dispatch;
pub mod logging;
pub mod property;
pub mod signal;

pub use dispatch::Dispatcher;
#[cfg(feature = "tokio")]
pub use dispatch::TokioDispatcher;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
