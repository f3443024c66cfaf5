//! View-model capabilities and their runtime probes.
//!
//! A view-model is any type implementing [`ViewModel`]. It opts into extra
//! conductor behavior by exposing one or more of four independent
//! capabilities through the trait's accessor methods:
//!
//! | Capability       | Conductor behavior                                      |
//! |------------------|---------------------------------------------------------|
//! | [`Closeable`]    | consulted before the window may close                   |
//! | [`Child`]        | receives the conductor as its closing delegate          |
//! | [`ScreenState`]  | activated, deactivated and closed with the window       |
//! | [`DisplayName`]  | drives the window title while the window has none       |
//!
//! # Example
//!
//! ```
//! use casement::capability::{CloseCheck, Closeable, DisplayName, DisplayNameCell, ViewModel};
//!
//! struct EditorViewModel {
//!     name: DisplayNameCell,
//!     dirty: bool,
//! }
//!
//! impl ViewModel for EditorViewModel {
//!     fn as_closeable(&self) -> Option<&dyn Closeable> {
//!         Some(self)
//!     }
//!     fn as_display_name(&self) -> Option<&dyn DisplayName> {
//!         Some(&self.name)
//!     }
//! }
//!
//! impl Closeable for EditorViewModel {
//!     fn can_close(&self) -> CloseCheck {
//!         CloseCheck::ready(!self.dirty)
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;

use casement_core::{Property, Signal};

use crate::error::CloseError;
use crate::window::DialogValue;

// ============================================================================
// View-model
// ============================================================================

/// An application view-model.
///
/// Every accessor defaults to `None`; override the ones matching the
/// capabilities the type implements. The conductor probes each one
/// independently, so any subset is valid.
pub trait ViewModel: Send + Sync {
    /// A human-readable type name used in log output and errors.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The close-permission capability, if implemented.
    fn as_closeable(&self) -> Option<&dyn Closeable> {
        None
    }

    /// The closing-delegate capability, if implemented.
    fn as_child(&self) -> Option<&dyn Child> {
        None
    }

    /// The activation lifecycle capability, if implemented.
    fn as_screen_state(&self) -> Option<&dyn ScreenState> {
        None
    }

    /// The display name capability, if implemented.
    fn as_display_name(&self) -> Option<&dyn DisplayName> {
        None
    }
}

/// Check whether a view-model can veto closing.
pub fn is_closeable(view_model: &dyn ViewModel) -> bool {
    view_model.as_closeable().is_some()
}

/// Check whether a view-model accepts a closing delegate.
pub fn is_child(view_model: &dyn ViewModel) -> bool {
    view_model.as_child().is_some()
}

/// Check whether a view-model wants lifecycle notifications.
pub fn has_screen_state(view_model: &dyn ViewModel) -> bool {
    view_model.as_screen_state().is_some()
}

/// Check whether a view-model exposes a display name.
pub fn has_display_name(view_model: &dyn ViewModel) -> bool {
    view_model.as_display_name().is_some()
}

/// The result of probing a view-model for all four capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub closeable: bool,
    pub child: bool,
    pub screen_state: bool,
    pub display_name: bool,
}

impl Capabilities {
    /// Probe a view-model.
    pub fn probe(view_model: &dyn ViewModel) -> Self {
        Self {
            closeable: is_closeable(view_model),
            child: is_child(view_model),
            screen_state: has_screen_state(view_model),
            display_name: has_display_name(view_model),
        }
    }

    /// Check whether no capability is implemented.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (self.closeable, "closeable"),
            (self.child, "child"),
            (self.screen_state, "screen-state"),
            (self.display_name, "display-name"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect();

        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

// ============================================================================
// Closeable
// ============================================================================

/// A view-model that decides whether its window may close.
pub trait Closeable: Send + Sync {
    /// Ask whether closing is currently permitted.
    ///
    /// The answer may be immediate ([`CloseCheck::ready`]) or arrive later
    /// ([`CloseCheck::pending`]), for example after asking the user to save.
    fn can_close(&self) -> CloseCheck;
}

/// The answer to a close-permission check, possibly not yet known.
///
/// `CloseCheck` is a future. An already-resolved check is consumed without
/// suspending; a pending one suspends only the close negotiation, never the
/// UI loop.
pub struct CloseCheck {
    inner: BoxFuture<'static, Result<bool, CloseError>>,
}

impl CloseCheck {
    /// An immediate answer.
    pub fn ready(allow: bool) -> Self {
        Self {
            inner: future::ready(Ok(allow)).boxed(),
        }
    }

    /// Closing is permitted.
    pub fn allow() -> Self {
        Self::ready(true)
    }

    /// Closing is refused.
    pub fn deny() -> Self {
        Self::ready(false)
    }

    /// The check itself failed.
    pub fn failed(error: CloseError) -> Self {
        Self {
            inner: future::ready(Err(error)).boxed(),
        }
    }

    /// An answer that arrives asynchronously.
    pub fn pending<F>(answer: F) -> Self
    where
        F: Future<Output = Result<bool, CloseError>> + Send + 'static,
    {
        Self {
            inner: answer.boxed(),
        }
    }
}

impl Future for CloseCheck {
    type Output = Result<bool, CloseError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for CloseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseCheck").finish_non_exhaustive()
    }
}

// ============================================================================
// Child
// ============================================================================

/// The party a [`Child`] view-model asks to close it.
///
/// The window conductor installs itself as the delegate of its view-model.
pub trait CloseDelegate: Send + Sync {
    /// Request that `item` be closed, optionally with a dialog result.
    ///
    /// Resolves to `true` if the item was closed. Requests for an item the
    /// delegate does not manage resolve to `false`.
    fn close_item(
        &self,
        item: &dyn ViewModel,
        result: Option<DialogValue>,
    ) -> BoxFuture<'static, Result<bool, CloseError>>;
}

/// A view-model that can be told who closes it.
pub trait Child: Send + Sync {
    /// The current closing delegate, if it is still alive.
    fn parent(&self) -> Option<Arc<dyn CloseDelegate>>;

    /// Install a closing delegate.
    fn set_parent(&self, parent: Weak<dyn CloseDelegate>);
}

/// Storage for a [`Child`]'s closing delegate.
///
/// Holds the delegate weakly; the conductor owns its own lifetime.
#[derive(Default)]
pub struct ParentSlot {
    parent: Mutex<Option<Weak<dyn CloseDelegate>>>,
}

impl ParentSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// The delegate, if one is installed and still alive.
    pub fn get(&self) -> Option<Arc<dyn CloseDelegate>> {
        self.parent.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Install a delegate, replacing any previous one.
    pub fn set(&self, parent: Weak<dyn CloseDelegate>) {
        *self.parent.lock() = Some(parent);
    }

    /// Ask the delegate to close `item`.
    ///
    /// Resolves to `false` without a live delegate.
    pub fn request_close(
        &self,
        item: &dyn ViewModel,
        result: Option<DialogValue>,
    ) -> BoxFuture<'static, Result<bool, CloseError>> {
        match self.get() {
            Some(parent) => parent.close_item(item, result),
            None => {
                tracing::debug!(
                    target: casement_core::logging::targets::CONDUCTOR,
                    view_model = item.type_name(),
                    "close requested without a closing delegate"
                );
                future::ready(Ok(false)).boxed()
            }
        }
    }
}

impl fmt::Debug for ParentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParentSlot")
            .field("has_parent", &self.get().is_some())
            .finish()
    }
}

// ============================================================================
// ScreenState
// ============================================================================

/// A view-model that follows its window's activation lifecycle.
pub trait ScreenState: Send + Sync {
    /// The window became visible and un-minimized.
    fn activate(&self);

    /// The window was minimized.
    fn deactivate(&self);

    /// The window closed. Implies deactivation.
    fn close(&self);
}

/// Status tracked by [`ScreenLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenStatus {
    /// Not yet activated, or minimized.
    #[default]
    Deactivated,
    /// Activated.
    Active,
    /// Closed. Terminal.
    Closed,
}

/// Idempotent activation bookkeeping for [`ScreenState`] implementers.
///
/// Repeated notifications collapse into one transition, and `close`
/// deactivates first when needed.
///
/// ```
/// use casement::capability::{ScreenLifecycle, ScreenStatus};
///
/// let screen = ScreenLifecycle::new();
/// assert!(screen.activate());
/// assert!(!screen.activate());
/// assert!(screen.close());
/// assert_eq!(screen.status(), ScreenStatus::Closed);
/// ```
#[derive(Debug, Default)]
pub struct ScreenLifecycle {
    status: Property<ScreenStatus>,
    /// Emitted on every status transition.
    pub status_changed: Signal<ScreenStatus>,
}

impl ScreenLifecycle {
    /// Create a deactivated lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current status.
    pub fn status(&self) -> ScreenStatus {
        self.status.get()
    }

    /// Check whether the screen is active.
    pub fn is_active(&self) -> bool {
        self.status() == ScreenStatus::Active
    }

    /// Move to `Active`. Returns `false` if already active or closed.
    pub fn activate(&self) -> bool {
        if self.status() == ScreenStatus::Closed {
            return false;
        }
        self.transition(ScreenStatus::Active)
    }

    /// Move to `Deactivated`. Returns `false` unless currently active.
    pub fn deactivate(&self) -> bool {
        if self.status() != ScreenStatus::Active {
            return false;
        }
        self.transition(ScreenStatus::Deactivated)
    }

    /// Move to `Closed`, deactivating first. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        if self.status() == ScreenStatus::Closed {
            return false;
        }
        self.deactivate();
        self.transition(ScreenStatus::Closed)
    }

    fn transition(&self, status: ScreenStatus) -> bool {
        if self.status.set(status) {
            self.status_changed.emit(status);
            true
        } else {
            false
        }
    }
}

impl ScreenState for ScreenLifecycle {
    fn activate(&self) {
        ScreenLifecycle::activate(self);
    }

    fn deactivate(&self) {
        ScreenLifecycle::deactivate(self);
    }

    fn close(&self) {
        ScreenLifecycle::close(self);
    }
}

// ============================================================================
// DisplayName
// ============================================================================

/// A view-model with an observable human-readable name.
pub trait DisplayName: Send + Sync {
    /// The current name.
    fn display_name(&self) -> String;

    /// Emitted with the new name whenever it changes.
    fn display_name_changed(&self) -> &Signal<String>;
}

/// A display name value paired with its change signal.
#[derive(Debug, Default)]
pub struct DisplayNameCell {
    value: Property<String>,
    changed: Signal<String>,
}

impl DisplayNameCell {
    /// Create a cell with an initial name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            value: Property::new(name.into()),
            changed: Signal::new(),
        }
    }

    /// Change the name, notifying observers if it differs.
    pub fn set(&self, name: impl Into<String>) {
        let name = name.into();
        if self.value.set(name.clone()) {
            self.changed.emit(name);
        }
    }
}

impl DisplayName for DisplayNameCell {
    fn display_name(&self) -> String {
        self.value.get()
    }

    fn display_name_changed(&self) -> &Signal<String> {
        &self.changed
    }
}
