//! Prelude module for Casement.
//!
//! ```
//! use casement::prelude::*;
//! ```

// ============================================================================
// Facade
// ============================================================================

pub use crate::{WindowManager, WindowManagerConfig};

// ============================================================================
// View-model capabilities
// ============================================================================

pub use crate::capability::{
    Child, CloseCheck, CloseDelegate, Closeable, DisplayName, DisplayNameCell, ParentSlot,
    ScreenLifecycle, ScreenState, ViewModel,
};

// ============================================================================
// Windows and views
// ============================================================================

pub use crate::view::{ActiveWindowProvider, View, ViewResolver};
pub use crate::window::{DialogValue, Window, WindowState};

// ============================================================================
// Message boxes
// ============================================================================

pub use crate::message_box::{MessageBoxButtons, MessageBoxIcon, MessageBoxParams, MessageBoxResult};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{CloseError, ResolveError};
