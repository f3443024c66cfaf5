//! Casement - view-model driven windows for MVVM desktop applications.
//!
//! Application code works with view-models only. Casement asks a
//! [`ViewResolver`] for each view-model's window, keeps the window's
//! lifecycle and the view-model's in step, and negotiates closing with
//! view-models that want a say in it.
//!
//! - [`WindowManager`]: show a view-model as a window, a modal dialog, or a
//!   message box
//! - [`WindowConductor`]: the per-window object binding the two lifecycles
//! - [`capability`]: the optional traits a view-model implements to opt into
//!   close negotiation, activation, closing delegation and title binding
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use casement::prelude::*;
//!
//! struct DocumentViewModel {
//!     name: DisplayNameCell,
//! }
//!
//! impl ViewModel for DocumentViewModel {
//!     fn as_display_name(&self) -> Option<&dyn DisplayName> {
//!         Some(&self.name)
//!     }
//! }
//!
//! let window = Arc::new(Window::new());
//! let view = View::Window(window.clone());
//! let manager = WindowManager::builder()
//!     .view_resolver(move |_: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
//!         Ok(view.clone())
//!     })
//!     .build();
//!
//! let document = Arc::new(DocumentViewModel { name: DisplayNameCell::new("Untitled") });
//! manager.show_window(document.clone(), None).unwrap();
//! assert_eq!(window.title().as_deref(), Some("Untitled"));
//!
//! document.name.set("Report.txt");
//! assert_eq!(window.title().as_deref(), Some("Report.txt"));
//! ```

pub mod capability;
pub mod conductor;
pub mod config;
pub mod error;
pub mod manager;
pub mod message_box;
pub mod owner;
pub mod prelude;
pub mod tracker;
pub mod view;
pub mod window;

pub use casement_core::{ConnectionId, Dispatcher, Property, Signal, TokioDispatcher};

pub use capability::{
    Capabilities, Child, CloseCheck, CloseDelegate, Closeable, DisplayName, DisplayNameCell,
    ParentSlot, ScreenLifecycle, ScreenState, ScreenStatus, ViewModel,
};
pub use conductor::{ConductorState, WindowConductor};
pub use config::{ButtonLabels, MessageBoxConfig, WindowManagerConfig};
pub use error::{CloseError, ConfigError, Error, OwnerError, ResolveError, Result};
pub use manager::{WindowManager, WindowManagerBuilder};
pub use message_box::{
    DefaultMessageBoxFactory, FlowDirection, MessageBox, MessageBoxButtons, MessageBoxFactory,
    MessageBoxIcon, MessageBoxParams, MessageBoxResult, MessageBoxViewModel, TextAlignment,
};
pub use tracker::WindowTracker;
pub use view::{ActiveWindowProvider, View, ViewResolver};
pub use window::{
    ClosingEvent, DialogValue, HeadlessBackend, Position, StartupLocation, Window, WindowBackend,
    WindowId, WindowLifecycle, WindowState,
};
