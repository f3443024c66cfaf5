//! Owner inference.
//!
//! Decides which window, if any, becomes the platform owner of a window
//! about to be shown. Candidates in priority order:
//!
//! 1. the window of an explicit owner view-model,
//! 2. for dialogs, the currently active window (never the window itself),
//! 3. nothing.

use std::sync::Arc;

use casement_core::logging::targets;

use crate::capability::ViewModel;
use crate::error::OwnerError;
use crate::view::{ActiveWindowProvider, ViewResolver};
use crate::window::Window;

/// The active window, unless it is `window` itself.
pub fn infer_owner_of(
    window: &Arc<Window>,
    active: &dyn ActiveWindowProvider,
) -> Option<Arc<Window>> {
    active
        .active_window()
        .filter(|candidate| !Arc::ptr_eq(candidate, window))
}

/// Pick the owner for `window`.
///
/// An explicit owner view-model whose view is not a window, or whose view
/// cannot be resolved, does not stop the show: selection falls through to
/// dialog inference.
pub fn resolve_owner(
    window: &Arc<Window>,
    owner_view_model: Option<&Arc<dyn ViewModel>>,
    is_dialog: bool,
    infer_dialog_owner: bool,
    resolver: &dyn ViewResolver,
    active: &dyn ActiveWindowProvider,
) -> Option<Arc<Window>> {
    if let Some(owner_view_model) = owner_view_model {
        match resolver.resolve(owner_view_model) {
            Ok(view) => match view.as_window() {
                Some(owner) if !Arc::ptr_eq(owner, window) => return Some(owner.clone()),
                Some(_) => {
                    tracing::warn!(
                        target: targets::WINDOW_MANAGER,
                        window = %window.id(),
                        "explicit owner resolves to the window being shown; ignoring it"
                    );
                }
                None => {
                    tracing::debug!(
                        target: targets::WINDOW_MANAGER,
                        owner = owner_view_model.type_name(),
                        view_type = view.type_name(),
                        "explicit owner view is not a window"
                    );
                }
            },
            Err(err) => {
                tracing::warn!(
                    target: targets::WINDOW_MANAGER,
                    owner = owner_view_model.type_name(),
                    error = %err,
                    "could not resolve the explicit owner's view"
                );
            }
        }
    }

    if is_dialog && infer_dialog_owner {
        return infer_owner_of(window, active);
    }
    None
}

/// Assign `owner` to `window`.
///
/// Platform refusals are logged and swallowed, leaving the window ownerless.
/// Any other failure is returned.
pub fn apply_owner(window: &Window, owner: &Arc<Window>) -> Result<(), OwnerError> {
    match window.set_owner(owner) {
        Ok(()) => {
            tracing::debug!(
                target: targets::WINDOW_MANAGER,
                window = %window.id(),
                owner = %owner.id(),
                "window owner assigned"
            );
            Ok(())
        }
        Err(err) if err.is_platform_refusal() => {
            tracing::warn!(
                target: targets::WINDOW_MANAGER,
                window = %window.id(),
                owner = %owner.id(),
                error = %err,
                "owner assignment refused; showing window without an owner"
            );
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::view::View;

    struct Plain;
    impl ViewModel for Plain {}

    fn shown() -> Arc<Window> {
        let window = Arc::new(Window::new());
        window.show();
        window
    }

    fn no_active() -> Option<Arc<Window>> {
        None
    }

    #[test]
    fn test_active_window_is_inferred() {
        let active = shown();
        let window = Arc::new(Window::new());
        let captured = active.clone();
        let provider = move || Some(captured.clone());

        let owner = infer_owner_of(&window, &provider).unwrap();
        assert!(Arc::ptr_eq(&owner, &active));
    }

    #[test]
    fn test_self_is_never_inferred() {
        let window = shown();
        let captured = window.clone();
        let provider = move || Some(captured.clone());

        assert!(infer_owner_of(&window, &provider).is_none());
    }

    #[test]
    fn test_explicit_owner_wins_over_inference() {
        let explicit = shown();
        let active = shown();
        let window = Arc::new(Window::new());

        let explicit_view = explicit.clone();
        let resolver = move |_: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
            Ok(View::Window(explicit_view.clone()))
        };
        let captured = active.clone();
        let provider = move || Some(captured.clone());
        let owner_vm: Arc<dyn ViewModel> = Arc::new(Plain);

        let owner = resolve_owner(&window, Some(&owner_vm), true, true, &resolver, &provider);
        assert!(Arc::ptr_eq(&owner.unwrap(), &explicit));
    }

    #[test]
    fn test_non_window_owner_falls_through() {
        let active = shown();
        let window = Arc::new(Window::new());
        let resolver = |_: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
            Ok(View::element("UserControl"))
        };
        let captured = active.clone();
        let provider = move || Some(captured.clone());
        let owner_vm: Arc<dyn ViewModel> = Arc::new(Plain);

        let dialog_owner = resolve_owner(&window, Some(&owner_vm), true, true, &resolver, &provider);
        assert!(Arc::ptr_eq(&dialog_owner.unwrap(), &active));

        let window_owner = resolve_owner(&window, Some(&owner_vm), false, true, &resolver, &provider);
        assert!(window_owner.is_none());
    }

    #[test]
    fn test_inference_can_be_disabled() {
        let active = shown();
        let window = Arc::new(Window::new());
        let resolver = |vm: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
            Err(ResolveError::new(vm.type_name(), "unused"))
        };
        let captured = active.clone();
        let provider = move || Some(captured.clone());

        assert!(resolve_owner(&window, None, true, false, &resolver, &provider).is_none());
        assert!(resolve_owner(&window, None, false, true, &resolver, &no_active).is_none());
    }

    #[test]
    fn test_platform_refusal_is_swallowed() {
        let window = Window::new();
        let closed = shown();
        closed.close().unwrap();

        assert_eq!(apply_owner(&window, &closed), Ok(()));
        assert!(window.owner().is_none());
    }

    #[test]
    fn test_other_owner_failures_propagate() {
        let root = shown();
        let child = shown();
        apply_owner(&child, &root).unwrap();

        assert_eq!(apply_owner(&root, &child), Err(OwnerError::Cycle));
    }
}
