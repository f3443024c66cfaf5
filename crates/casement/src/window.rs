//! Platform window handle.
//!
//! [`Window`] is the object a view resolver hands back for a view-model. It
//! owns the small set of window properties the conductor manipulates (title,
//! startup position, owner, state) and raises the native lifecycle events
//! the conductor listens to:
//!
//! - `state_changed(WindowState)`: the window was minimized, restored or maximized
//! - `closing(ClosingEvent)`: a close was attempted; handlers may cancel it
//! - `closed()`: the close went through
//! - `activated()`: the window became the active window
//! - `title_changed(String)`: the title text changed
//!
//! Toolkit integrations forward native operations through a
//! [`WindowBackend`]; [`HeadlessBackend`] is used when there is nothing to
//! forward to.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use casement::window::{Window, WindowState};
//!
//! let window = Arc::new(Window::new().with_title("Preferences"));
//!
//! window.closing.connect(|event| {
//!     // Keep the window open.
//!     event.cancel();
//! });
//!
//! window.show();
//! window.set_state(WindowState::Minimized);
//! assert_eq!(window.close().unwrap(), false);
//! assert!(!window.is_closed());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use casement_core::logging::targets;
use casement_core::{ConnectionId, Property, Signal};

use crate::capability::ViewModel;
use crate::error::{CloseError, OwnerError};

// ============================================================================
// Identifiers and simple state
// ============================================================================

/// Global counter for generating unique window IDs.
static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this window ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// The display state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    /// Normal window state (default size and position).
    #[default]
    Normal,
    /// Window is minimized (iconified).
    Minimized,
    /// Window is maximized (fills available space).
    Maximized,
    /// Window is fullscreen (covers entire screen, no decorations).
    Fullscreen,
}

impl WindowState {
    /// Check if the window is in a normal state.
    pub fn is_normal(&self) -> bool {
        matches!(self, WindowState::Normal)
    }

    /// Check if the window is minimized.
    pub fn is_minimized(&self) -> bool {
        matches!(self, WindowState::Minimized)
    }

    /// Check if the window is maximized.
    pub fn is_maximized(&self) -> bool {
        matches!(self, WindowState::Maximized)
    }

    /// Check if the window is fullscreen.
    pub fn is_fullscreen(&self) -> bool {
        matches!(self, WindowState::Fullscreen)
    }

    /// Check if the window is on screen (not minimized).
    pub fn is_visible_state(&self) -> bool {
        !self.is_minimized()
    }
}

/// Where a window is placed when first shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StartupLocation {
    /// Use the window's own position (or the platform default).
    #[default]
    Manual,
    /// Center on the screen.
    CenterScreen,
    /// Center on the owner window.
    CenterOwner,
}

/// A window position in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where a window is in its native lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowLifecycle {
    /// Constructed but never shown.
    #[default]
    Created,
    /// Visible on screen.
    Shown,
    /// Closed. Terminal.
    Closed,
}

// ============================================================================
// Dialog values and closing events
// ============================================================================

/// A type-erased dialog result.
///
/// A view-model closes its dialog with any `Send` value; the caller awaiting
/// the dialog recovers it with [`DialogValue::downcast`].
pub struct DialogValue(Box<dyn Any + Send>);

impl DialogValue {
    /// Wrap a result value.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Check whether the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Recover the value as a `T`, or get `self` back on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        self.0.downcast::<T>().map(|value| *value).map_err(Self)
    }
}

impl fmt::Debug for DialogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DialogValue(..)")
    }
}

#[derive(Debug, Default)]
struct ClosingState {
    cancelled: AtomicBool,
    fault: Mutex<Option<CloseError>>,
}

/// Payload of the `closing` signal.
///
/// Handlers share one event per close attempt: cancelling it keeps the
/// window open, and failing it additionally reports a fault to whoever
/// called [`Window::close`].
#[derive(Debug, Clone, Default)]
pub struct ClosingEvent {
    state: Arc<ClosingState>,
}

impl ClosingEvent {
    /// Create an uncancelled event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the window open.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether some handler cancelled the close.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel the close and report a fault. The first fault wins.
    pub fn fail(&self, error: CloseError) {
        self.cancel();
        let mut fault = self.state.fault.lock();
        if fault.is_none() {
            *fault = Some(error);
        }
    }

    /// The reported fault, if any.
    pub fn fault(&self) -> Option<CloseError> {
        self.state.fault.lock().clone()
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Native operations a toolkit integration performs for a [`Window`].
///
/// Every method has a no-op default, so integrations only implement what
/// their platform supports.
pub trait WindowBackend: Send + Sync {
    /// Make the window visible, modally or not.
    fn show(&self, _window: WindowId, _modal: bool) {}

    /// Bring the window to the foreground.
    fn activate(&self, _window: WindowId) {}

    /// Update the native title.
    fn apply_title(&self, _window: WindowId, _title: &str) {}

    /// Make `owner` the native owner of `window`.
    fn apply_owner(&self, _window: WindowId, _owner: WindowId) -> Result<(), OwnerError> {
        Ok(())
    }

    /// Update the native display state.
    fn apply_state(&self, _window: WindowId, _state: WindowState) {}

    /// Place the window when it is first shown.
    fn apply_startup_location(&self, _window: WindowId, _location: StartupLocation) {}

    /// Destroy the native window.
    fn close(&self, _window: WindowId) {}
}

/// A backend with no native window behind it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessBackend;

impl WindowBackend for HeadlessBackend {}

// ============================================================================
// Window
// ============================================================================

/// Keeps the window title in sync with a view-model's display name.
struct TitleBinding {
    source: Arc<dyn ViewModel>,
    connection: ConnectionId,
}

impl TitleBinding {
    fn release(self) {
        if let Some(name) = self.source.as_display_name() {
            name.display_name_changed().disconnect(self.connection);
        }
    }
}

/// A top-level window.
///
/// Windows are shared as `Arc<Window>`. Only the conductor attached to a
/// window and the manager that created it mutate it.
pub struct Window {
    id: WindowId,
    backend: Arc<dyn WindowBackend>,
    title: Property<Option<String>>,
    title_binding: Mutex<Option<TitleBinding>>,
    startup_location: Property<StartupLocation>,
    position: Property<Option<Position>>,
    owner: Mutex<Option<Weak<Window>>>,
    state: Property<WindowState>,
    lifecycle: Property<WindowLifecycle>,
    modal: AtomicBool,
    close_in_progress: AtomicBool,
    dialog_result: Mutex<Option<DialogValue>>,
    dialog_sender: Mutex<Option<oneshot::Sender<Option<DialogValue>>>>,

    // Signals
    /// Emitted when the display state changes.
    pub state_changed: Signal<WindowState>,
    /// Emitted when a close is attempted. Handlers may cancel it.
    pub closing: Signal<ClosingEvent>,
    /// Emitted once, after the window has closed.
    pub closed: Signal<()>,
    /// Emitted when the window is activated.
    pub activated: Signal<()>,
    /// Emitted when the title text changes.
    pub title_changed: Signal<String>,
}

impl Window {
    /// Create an untitled window with a headless backend.
    pub fn new() -> Self {
        Self {
            id: WindowId::next(),
            backend: Arc::new(HeadlessBackend),
            title: Property::new(None),
            title_binding: Mutex::new(None),
            startup_location: Property::new(StartupLocation::Manual),
            position: Property::new(None),
            owner: Mutex::new(None),
            state: Property::new(WindowState::Normal),
            lifecycle: Property::new(WindowLifecycle::Created),
            modal: AtomicBool::new(false),
            close_in_progress: AtomicBool::new(false),
            dialog_result: Mutex::new(None),
            dialog_sender: Mutex::new(None),
            state_changed: Signal::new(),
            closing: Signal::new(),
            closed: Signal::new(),
            activated: Signal::new(),
            title_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Builder Pattern Methods
    // =========================================================================

    /// Set an explicit title using builder pattern.
    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.title.set_silent(Some(title.into()));
        self
    }

    /// Position the window manually using builder pattern.
    pub fn with_position(self, x: f64, y: f64) -> Self {
        self.position.set_silent(Some(Position::new(x, y)));
        self
    }

    /// Set the startup location using builder pattern.
    pub fn with_startup_location(self, location: StartupLocation) -> Self {
        self.startup_location.set_silent(location);
        self
    }

    /// Set the initial display state using builder pattern.
    pub fn with_state(self, state: WindowState) -> Self {
        self.state.set_silent(state);
        self
    }

    /// Forward native operations to `backend` using builder pattern.
    pub fn with_backend(mut self, backend: Arc<dyn WindowBackend>) -> Self {
        self.backend = backend;
        self
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// The window's unique identifier.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The current title, if any.
    pub fn title(&self) -> Option<String> {
        self.title.get()
    }

    /// Check whether the window has a title.
    pub fn has_title(&self) -> bool {
        self.title.with(Option::is_some)
    }

    /// Set an explicit title, replacing any display name binding.
    pub fn set_title(&self, title: impl Into<String>) {
        self.release_title_binding();
        self.apply_title(title.into());
    }

    /// Check whether the title follows a view-model's display name.
    pub fn is_title_bound(&self) -> bool {
        self.title_binding.lock().is_some()
    }

    /// Drive the title from `view_model`'s display name.
    ///
    /// Returns `false` if the view-model exposes no display name. The binding
    /// lasts until the window closes or [`set_title`](Self::set_title) is called.
    pub fn bind_title_to(self: &Arc<Self>, view_model: &Arc<dyn ViewModel>) -> bool {
        let Some(name) = view_model.as_display_name() else {
            return false;
        };
        self.release_title_binding();

        self.apply_title(name.display_name());

        let weak = Arc::downgrade(self);
        let connection = name.display_name_changed().connect(move |title: &String| {
            if let Some(window) = weak.upgrade() {
                window.apply_title(title.clone());
            }
        });

        *self.title_binding.lock() = Some(TitleBinding {
            source: view_model.clone(),
            connection,
        });
        true
    }

    fn apply_title(&self, title: String) {
        if self.title.set(Some(title.clone())) {
            self.backend.apply_title(self.id, &title);
            self.title_changed.emit(title);
        }
    }

    fn release_title_binding(&self) {
        let binding = self.title_binding.lock().take();
        if let Some(binding) = binding {
            binding.release();
        }
    }

    /// Where the window is placed when first shown.
    pub fn startup_location(&self) -> StartupLocation {
        self.startup_location.get()
    }

    /// Change where the window is placed when first shown.
    pub fn set_startup_location(&self, location: StartupLocation) {
        if self.startup_location.set(location) {
            self.backend.apply_startup_location(self.id, location);
        }
    }

    /// The manually assigned position, if any.
    pub fn position(&self) -> Option<Position> {
        self.position.get()
    }

    /// Position the window manually.
    pub fn set_position(&self, x: f64, y: f64) {
        self.position.set(Some(Position::new(x, y)));
    }

    /// Check whether the caller positioned the window explicitly.
    pub fn has_manual_position(&self) -> bool {
        self.position.with(Option::is_some)
    }

    /// The owner window, if one is assigned and still alive.
    pub fn owner(&self) -> Option<Arc<Window>> {
        self.owner.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Make `owner` this window's platform owner.
    ///
    /// An owner can be assigned once. The owner must currently be shown, must
    /// not be this window, and must not already be owned (directly or
    /// transitively) by this window.
    pub fn set_owner(&self, owner: &Arc<Window>) -> Result<(), OwnerError> {
        if std::ptr::eq(self, Arc::as_ptr(owner)) {
            return Err(OwnerError::SelfOwnership);
        }
        if self.owner.lock().is_some() {
            return Err(OwnerError::AlreadyAssigned);
        }
        match owner.lifecycle() {
            WindowLifecycle::Created => return Err(OwnerError::OwnerNotShown),
            WindowLifecycle::Closed => return Err(OwnerError::OwnerClosed),
            WindowLifecycle::Shown => {}
        }

        let mut ancestor = owner.owner();
        while let Some(window) = ancestor {
            if std::ptr::eq(self, Arc::as_ptr(&window)) {
                return Err(OwnerError::Cycle);
            }
            ancestor = window.owner();
        }

        self.backend.apply_owner(self.id, owner.id)?;
        *self.owner.lock() = Some(Arc::downgrade(owner));
        Ok(())
    }

    /// The current display state.
    pub fn state(&self) -> WindowState {
        self.state.get()
    }

    /// Change the display state.
    ///
    /// Toolkit integrations also call this when the user minimizes or restores
    /// the window. Ignored once the window is closed.
    pub fn set_state(&self, state: WindowState) {
        if self.is_closed() {
            return;
        }
        if self.state.set(state) {
            self.backend.apply_state(self.id, state);
            tracing::trace!(target: targets::WINDOW, window = %self.id, ?state, "window state changed");
            self.state_changed.emit(state);
        }
    }

    /// Where the window is in its native lifecycle.
    pub fn lifecycle(&self) -> WindowLifecycle {
        self.lifecycle.get()
    }

    /// Check whether the window is on screen.
    pub fn is_shown(&self) -> bool {
        self.lifecycle() == WindowLifecycle::Shown
    }

    /// Check whether the window has closed.
    pub fn is_closed(&self) -> bool {
        self.lifecycle() == WindowLifecycle::Closed
    }

    /// Check whether the window was shown as a modal dialog.
    pub fn is_modal(&self) -> bool {
        self.modal.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Show the window non-modally.
    pub fn show(&self) {
        match self.lifecycle() {
            WindowLifecycle::Created => {
                self.lifecycle.set(WindowLifecycle::Shown);
                self.backend.show(self.id, self.is_modal());
                tracing::debug!(target: targets::WINDOW, window = %self.id, modal = self.is_modal(), "window shown");
            }
            WindowLifecycle::Shown => {}
            WindowLifecycle::Closed => {
                tracing::warn!(target: targets::WINDOW, window = %self.id, "cannot show a closed window");
            }
        }
    }

    /// Show the window as a modal dialog.
    ///
    /// The returned receiver yields the dialog result once the window closes:
    /// `Some` if the window was closed with a result, `None` otherwise. It
    /// errors if the window is dropped without closing.
    pub fn show_dialog(&self) -> oneshot::Receiver<Option<DialogValue>> {
        let (sender, receiver) = oneshot::channel();
        if self.is_closed() {
            tracing::warn!(target: targets::WINDOW, window = %self.id, "cannot show a closed window as a dialog");
            let _ = sender.send(None);
            return receiver;
        }
        if self.is_shown() {
            tracing::warn!(target: targets::WINDOW, window = %self.id, "window already shown; showing as dialog has no visual effect");
        }

        self.modal.store(true, Ordering::SeqCst);
        *self.dialog_sender.lock() = Some(sender);
        self.show();
        receiver
    }

    /// Bring a shown window to the foreground.
    pub fn activate(&self) {
        if !self.is_shown() {
            return;
        }
        self.backend.activate(self.id);
        self.activated.emit(());
    }

    /// Attempt to close the window.
    ///
    /// Runs the `closing` handlers first. Returns `Ok(true)` if the window
    /// closed, `Ok(false)` if a handler cancelled (or the window was already
    /// closed or closing), and `Err` if a handler reported a fault.
    pub fn close(&self) -> Result<bool, CloseError> {
        if self.is_closed() {
            return Ok(false);
        }
        if self.close_in_progress.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: targets::WINDOW, window = %self.id, "close already in progress");
            return Ok(false);
        }

        let event = ClosingEvent::new();
        self.closing.emit(event.clone());
        self.close_in_progress.store(false, Ordering::SeqCst);

        if let Some(fault) = event.fault() {
            return Err(fault);
        }
        if event.is_cancelled() {
            tracing::debug!(target: targets::WINDOW, window = %self.id, "close cancelled");
            return Ok(false);
        }

        self.finish_close();
        Ok(true)
    }

    /// Attempt to close the window, reporting `result` to a dialog caller.
    ///
    /// If the close does not go through, the previous result is restored.
    pub fn close_with_result(&self, result: Option<DialogValue>) -> Result<bool, CloseError> {
        if self.is_closed() {
            return Ok(false);
        }

        let previous = std::mem::replace(&mut *self.dialog_result.lock(), result);
        let outcome = self.close();
        if !matches!(outcome, Ok(true)) {
            *self.dialog_result.lock() = previous;
        }
        outcome
    }

    fn finish_close(&self) {
        self.lifecycle.set(WindowLifecycle::Closed);
        self.release_title_binding();
        self.backend.close(self.id);
        tracing::debug!(target: targets::WINDOW, window = %self.id, "window closed");

        self.closed.emit(());

        let result = self.dialog_result.lock().take();
        let sender = self.dialog_sender.lock().take();
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title())
            .field("state", &self.state())
            .field("lifecycle", &self.lifecycle())
            .field("modal", &self.is_modal())
            .finish()
    }
}

static_assertions::assert_impl_all!(Window: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DisplayName, DisplayNameCell};

    struct Titled {
        name: DisplayNameCell,
    }

    impl ViewModel for Titled {
        fn as_display_name(&self) -> Option<&dyn DisplayName> {
            Some(&self.name)
        }
    }

    fn shown() -> Arc<Window> {
        let window = Arc::new(Window::new());
        window.show();
        window
    }

    #[test]
    fn test_window_ids_are_unique() {
        let a = Window::new();
        let b = Window::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().to_string().starts_with("window#"));
    }

    #[test]
    fn test_builder_sets_initial_properties() {
        let window = Window::new()
            .with_title("About")
            .with_position(10.0, 20.0)
            .with_startup_location(StartupLocation::CenterScreen)
            .with_state(WindowState::Maximized);

        assert_eq!(window.title().as_deref(), Some("About"));
        assert_eq!(window.position(), Some(Position::new(10.0, 20.0)));
        assert!(window.has_manual_position());
        assert_eq!(window.startup_location(), StartupLocation::CenterScreen);
        assert!(window.state().is_maximized());
        assert_eq!(window.lifecycle(), WindowLifecycle::Created);
    }

    #[test]
    fn test_title_binding_follows_display_name() {
        let window = Arc::new(Window::new());
        let vm = Arc::new(Titled {
            name: DisplayNameCell::new("Hello"),
        });
        let view_model: Arc<dyn ViewModel> = vm.clone();

        assert!(window.bind_title_to(&view_model));
        assert_eq!(window.title().as_deref(), Some("Hello"));

        vm.name.set("World");
        assert_eq!(window.title().as_deref(), Some("World"));
        assert!(window.is_title_bound());
    }

    #[test]
    fn test_explicit_title_replaces_binding() {
        let window = Arc::new(Window::new());
        let vm = Arc::new(Titled {
            name: DisplayNameCell::new("Hello"),
        });
        let view_model: Arc<dyn ViewModel> = vm.clone();
        window.bind_title_to(&view_model);

        window.set_title("Fixed");
        vm.name.set("Ignored");

        assert_eq!(window.title().as_deref(), Some("Fixed"));
        assert!(!window.is_title_bound());
        assert_eq!(vm.name.display_name_changed().connection_count(), 0);
    }

    #[test]
    fn test_binding_released_on_close() {
        let window = shown();
        let vm = Arc::new(Titled {
            name: DisplayNameCell::new("Hello"),
        });
        let view_model: Arc<dyn ViewModel> = vm.clone();
        window.bind_title_to(&view_model);

        assert!(window.close().unwrap());
        assert_eq!(vm.name.display_name_changed().connection_count(), 0);
    }

    #[test]
    fn test_close_runs_closing_then_closed() {
        let window = shown();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_clone = order.clone();
        window.closing.connect(move |_| order_clone.lock().push("closing"));
        let order_clone = order.clone();
        window.closed.connect(move |_| order_clone.lock().push("closed"));

        assert!(window.close().unwrap());
        assert!(window.is_closed());
        assert!(!window.close().unwrap());
        assert_eq!(*order.lock(), vec!["closing", "closed"]);
    }

    #[test]
    fn test_cancelled_close_keeps_window_open() {
        let window = shown();
        window.closing.connect(|event| event.cancel());

        assert!(!window.close().unwrap());
        assert!(window.is_shown());
    }

    #[test]
    fn test_closing_fault_propagates_to_caller() {
        let window = shown();
        window.closing.connect(|event| event.fail(CloseError::new("save failed")));

        let err = window.close().unwrap_err();
        assert_eq!(err.message(), "save failed");
        assert!(window.is_shown());
    }

    #[test]
    fn test_close_from_closing_handler_is_ignored() {
        let window = shown();
        let weak = Arc::downgrade(&window);
        let nested = Arc::new(Mutex::new(None));

        let nested_clone = nested.clone();
        window.closing.connect(move |_| {
            if let Some(window) = weak.upgrade() {
                *nested_clone.lock() = Some(window.close());
            }
        });

        assert!(window.close().unwrap());
        assert!(matches!(*nested.lock(), Some(Ok(false))));
    }

    #[tokio::test]
    async fn test_dialog_receives_close_result() {
        let window = Arc::new(Window::new());
        let receiver = window.show_dialog();
        assert!(window.is_modal());

        assert!(window.close_with_result(Some(DialogValue::new(42_u32))).unwrap());

        let value = receiver.await.unwrap().unwrap();
        assert_eq!(value.downcast::<u32>().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_cancelled_close_restores_previous_result() {
        let window = Arc::new(Window::new());
        let receiver = window.show_dialog();
        let cancel = window.closing.connect(|event| event.cancel());

        assert!(!window.close_with_result(Some(DialogValue::new("discarded"))).unwrap());
        window.closing.disconnect(cancel);
        assert!(window.close().unwrap());

        assert!(receiver.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_dialog_reports_abandonment() {
        let window = Window::new();
        let receiver = window.show_dialog();
        drop(window);
        assert!(receiver.await.is_err());
    }

    #[test]
    fn test_dialog_value_downcast_mismatch() {
        let value = DialogValue::new(true);
        assert!(value.is::<bool>());
        let value = value.downcast::<String>().unwrap_err();
        assert!(value.downcast::<bool>().unwrap());
    }

    #[test]
    fn test_state_changes_emit_once() {
        let window = shown();
        let states = Arc::new(Mutex::new(Vec::new()));

        let states_clone = states.clone();
        window.state_changed.connect(move |&state| states_clone.lock().push(state));

        window.set_state(WindowState::Minimized);
        window.set_state(WindowState::Minimized);
        window.set_state(WindowState::Normal);
        window.close().unwrap();
        window.set_state(WindowState::Maximized);

        assert_eq!(*states.lock(), vec![WindowState::Minimized, WindowState::Normal]);
    }

    #[test]
    fn test_activate_requires_shown_window() {
        let window = Arc::new(Window::new());
        let count = Arc::new(Mutex::new(0));

        let count_clone = count.clone();
        window.activated.connect(move |_| *count_clone.lock() += 1);

        window.activate();
        window.show();
        window.activate();

        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_owner_rules() {
        let window = Arc::new(Window::new());
        assert_eq!(window.set_owner(&window), Err(OwnerError::SelfOwnership));

        let hidden = Arc::new(Window::new());
        assert_eq!(window.set_owner(&hidden), Err(OwnerError::OwnerNotShown));

        let closed = shown();
        closed.close().unwrap();
        assert_eq!(window.set_owner(&closed), Err(OwnerError::OwnerClosed));

        let owner = shown();
        assert_eq!(window.set_owner(&owner), Ok(()));
        assert!(Arc::ptr_eq(&window.owner().unwrap(), &owner));
        assert_eq!(window.set_owner(&owner), Err(OwnerError::AlreadyAssigned));
    }

    #[test]
    fn test_owner_cycle_rejected() {
        let root = shown();
        let child = shown();
        child.set_owner(&root).unwrap();

        assert_eq!(root.set_owner(&child), Err(OwnerError::Cycle));
        assert!(root.owner().is_none());
    }

    #[test]
    fn test_backend_refusal_leaves_window_ownerless() {
        struct Refusing;
        impl WindowBackend for Refusing {
            fn apply_owner(&self, _window: WindowId, _owner: WindowId) -> Result<(), OwnerError> {
                Err(OwnerError::PlatformRefused("application is shutting down".into()))
            }
        }

        let window = Window::new().with_backend(Arc::new(Refusing));
        let owner = shown();

        let err = window.set_owner(&owner).unwrap_err();
        assert!(err.is_platform_refusal());
        assert!(window.owner().is_none());
    }
}
