//! Error types for the window conductor.

use std::fmt;
use std::sync::Arc;

use crate::window::WindowId;

/// Result type alias for window manager operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned to callers of the [`WindowManager`](crate::WindowManager).
///
/// Each error is scoped to the single show or dialog call that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The view resolved for a view-model is not a window.
    #[error("view-model {view_model} resolved to a {view_type}, which is not a window")]
    InvalidViewType {
        view_model: &'static str,
        view_type: String,
    },

    /// The view resolver could not produce a view.
    #[error(transparent)]
    ViewResolution(#[from] ResolveError),

    /// Assigning the window owner failed for a reason other than a
    /// platform refusal.
    #[error("failed to assign window owner: {0}")]
    Owner(#[from] OwnerError),

    /// The window resolved for a view-model already has a conductor.
    #[error("view-model {view_model} is already displayed in {window}")]
    AlreadyShown {
        view_model: &'static str,
        window: WindowId,
    },

    /// The dialog closed with a result of a different type than requested.
    #[error("dialog result is not a {expected}")]
    DialogResultType { expected: &'static str },

    /// The dialog window was dropped without ever closing.
    #[error("dialog window was dropped before it closed")]
    DialogAbandoned,
}

/// Failure reported by a [`ViewResolver`](crate::ViewResolver).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not resolve a view for {view_model}: {message}")]
pub struct ResolveError {
    view_model: String,
    message: String,
}

impl ResolveError {
    /// Create a resolve error for a view-model type.
    pub fn new(view_model: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            view_model: view_model.into(),
            message: message.into(),
        }
    }

    /// The name of the view-model that failed to resolve.
    pub fn view_model(&self) -> &str {
        &self.view_model
    }
}

/// Reasons a window owner cannot be assigned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnerError {
    /// The prospective owner has never been shown.
    #[error("owner window has not been shown")]
    OwnerNotShown,

    /// The prospective owner has already closed.
    #[error("owner window has already closed")]
    OwnerClosed,

    /// The platform refused to reparent the window.
    #[error("platform refused to set the window owner: {0}")]
    PlatformRefused(String),

    /// A window cannot own itself.
    #[error("a window cannot own itself")]
    SelfOwnership,

    /// The assignment would create an ownership cycle.
    #[error("owner assignment would create an ownership cycle")]
    Cycle,

    /// The window already has an owner.
    #[error("window owner has already been assigned")]
    AlreadyAssigned,
}

impl OwnerError {
    /// Whether this failure is the platform declining the assignment.
    ///
    /// These are the failures seen while the application shuts down; they
    /// are logged and the window is shown without an owner.
    pub fn is_platform_refusal(&self) -> bool {
        matches!(
            self,
            Self::OwnerNotShown | Self::OwnerClosed | Self::PlatformRefused(_)
        )
    }
}

/// A fault raised by a view-model's close-permission check.
///
/// Cheap to clone so it can travel through signals and closing events.
#[derive(Clone)]
pub struct CloseError {
    message: String,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl CloseError {
    /// Create a close error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a close error wrapping an underlying error.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseError")
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CloseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

/// Errors loading a [`WindowManagerConfig`](crate::WindowManagerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_platform_refusals() {
        assert!(OwnerError::OwnerNotShown.is_platform_refusal());
        assert!(OwnerError::OwnerClosed.is_platform_refusal());
        assert!(OwnerError::PlatformRefused("shutting down".into()).is_platform_refusal());
        assert!(!OwnerError::SelfOwnership.is_platform_refusal());
        assert!(!OwnerError::Cycle.is_platform_refusal());
        assert!(!OwnerError::AlreadyAssigned.is_platform_refusal());
    }

    #[test]
    fn test_close_error_source() {
        let io = std::io::Error::other("disk unavailable");
        let err = CloseError::with_source("could not save document", io);

        assert_eq!(err.to_string(), "could not save document");
        assert_eq!(err.source().unwrap().to_string(), "disk unavailable");
        assert!(CloseError::new("plain").source().is_none());
    }

    #[test]
    fn test_invalid_view_type_message() {
        let err = Error::InvalidViewType {
            view_model: "ShellViewModel",
            view_type: "UserControl".into(),
        };
        assert_eq!(
            err.to_string(),
            "view-model ShellViewModel resolved to a UserControl, which is not a window"
        );
    }
}
