//! Collaborators the window manager consumes.
//!
//! Casement does not know how a view-model becomes something visual. A
//! [`ViewResolver`] supplied by the application does that, and an
//! [`ActiveWindowProvider`] answers which window currently has focus.
//! Both have blanket implementations for closures so tests and small
//! applications can pass plain functions.

use std::fmt;
use std::sync::Arc;

use crate::capability::ViewModel;
use crate::error::ResolveError;
use crate::window::Window;

/// A view resolved for a view-model.
#[derive(Clone)]
pub enum View {
    /// A top-level window.
    Window(Arc<Window>),
    /// Any visual element that is not a window, such as an embeddable
    /// control. Identified only by its type name.
    Element { type_name: String },
}

impl View {
    /// Create a non-window view from a type name.
    pub fn element(type_name: impl Into<String>) -> Self {
        Self::Element {
            type_name: type_name.into(),
        }
    }

    /// The window, if this view is one.
    pub fn as_window(&self) -> Option<&Arc<Window>> {
        match self {
            Self::Window(window) => Some(window),
            Self::Element { .. } => None,
        }
    }

    /// A human-readable name for the kind of view.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Window(_) => "Window",
            Self::Element { type_name } => type_name,
        }
    }
}

impl From<Arc<Window>> for View {
    fn from(window: Arc<Window>) -> Self {
        Self::Window(window)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Window(window) => f.debug_tuple("Window").field(&window.id()).finish(),
            Self::Element { type_name } => f
                .debug_struct("Element")
                .field("type_name", type_name)
                .finish(),
        }
    }
}

/// Resolves a view-model to its bound view.
///
/// Resolution must be idempotent: resolving the same live view-model twice
/// returns the same view. The window manager relies on this to find the
/// window of an explicit owner view-model.
pub trait ViewResolver: Send + Sync {
    /// Resolve the view bound to `view_model`.
    fn resolve(&self, view_model: &Arc<dyn ViewModel>) -> Result<View, ResolveError>;
}

impl<F> ViewResolver for F
where
    F: Fn(&Arc<dyn ViewModel>) -> Result<View, ResolveError> + Send + Sync,
{
    fn resolve(&self, view_model: &Arc<dyn ViewModel>) -> Result<View, ResolveError> {
        self(view_model)
    }
}

/// Answers which window is currently active.
///
/// A read-only query into process-wide UI state, consulted during owner
/// inference.
pub trait ActiveWindowProvider: Send + Sync {
    /// The active window, if any.
    fn active_window(&self) -> Option<Arc<Window>>;
}

impl<F> ActiveWindowProvider for F
where
    F: Fn() -> Option<Arc<Window>> + Send + Sync,
{
    fn active_window(&self) -> Option<Arc<Window>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_kinds() {
        let window = Arc::new(Window::new());
        let view = View::from(window.clone());
        assert!(Arc::ptr_eq(view.as_window().unwrap(), &window));
        assert_eq!(view.type_name(), "Window");

        let element = View::element("UserControl");
        assert!(element.as_window().is_none());
        assert_eq!(element.type_name(), "UserControl");
    }

    #[test]
    fn test_closures_are_collaborators() {
        let window = Arc::new(Window::new());
        let captured = window.clone();
        let provider = move || Some(captured.clone());
        assert!(Arc::ptr_eq(&provider.active_window().unwrap(), &window));

        let resolver = |vm: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
            Err(ResolveError::new(vm.type_name(), "no view registered"))
        };
        struct Plain;
        impl ViewModel for Plain {}
        let vm: Arc<dyn ViewModel> = Arc::new(Plain);
        let err = resolver.resolve(&vm).unwrap_err();
        assert!(err.view_model().ends_with("Plain"));
    }
}
