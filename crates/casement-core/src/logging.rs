//! Logging facilities for Casement.
//!
//! Casement uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("casement=debug,casement_core=info")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted with one of the [`targets`] below, so individual
//! subsystems can be filtered with `EnvFilter` directives such as
//! `casement::conductor=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "casement_core::signal";
    /// Event-loop dispatch target.
    pub const DISPATCH: &str = "casement_core::dispatch";
    /// Window handle target.
    pub const WINDOW: &str = "casement::window";
    /// Window tracker target.
    pub const TRACKER: &str = "casement::tracker";
    /// Window/screen conductor target.
    pub const CONDUCTOR: &str = "casement::conductor";
    /// Window manager facade target.
    pub const WINDOW_MANAGER: &str = "casement::window_manager";
    /// Message box target.
    pub const MESSAGE_BOX: &str = "casement::message_box";
}
