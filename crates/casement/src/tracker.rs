//! Registry of open windows.
//!
//! The [`WindowTracker`] keeps every window the window manager shows, in the
//! order they were last activated. It is the default
//! [`ActiveWindowProvider`]: the active window is the most recently
//! activated window that is still on screen.
//!
//! Windows unregister themselves when they close.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use casement_core::logging::targets;
use casement_core::{ConnectionId, Signal};

use crate::view::ActiveWindowProvider;
use crate::window::{Window, WindowId};

struct TrackedWindow {
    window: Arc<Window>,
    activated: ConnectionId,
    closed: ConnectionId,
}

impl TrackedWindow {
    fn release(&self) {
        self.window.activated.disconnect(self.activated);
        self.window.closed.disconnect(self.closed);
    }
}

/// Tracks open windows and which of them is active.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use casement::{ActiveWindowProvider, Window, WindowTracker};
///
/// let tracker = Arc::new(WindowTracker::new());
/// let window = Arc::new(Window::new());
///
/// tracker.register(&window);
/// window.show();
/// window.activate();
/// assert!(Arc::ptr_eq(&tracker.active_window().unwrap(), &window));
///
/// window.close().unwrap();
/// assert!(tracker.is_empty());
/// ```
pub struct WindowTracker {
    /// All registered windows.
    windows: RwLock<HashMap<WindowId, TrackedWindow>>,
    /// Registered window IDs, least recently activated first.
    activation_order: RwLock<Vec<WindowId>>,
    /// Signal emitted when a window is registered.
    window_registered: Signal<WindowId>,
    /// Signal emitted when a window is unregistered.
    window_unregistered: Signal<WindowId>,
    /// Signal emitted when a registered window is activated.
    window_activated: Signal<WindowId>,
}

impl WindowTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            activation_order: RwLock::new(Vec::new()),
            window_registered: Signal::new(),
            window_unregistered: Signal::new(),
            window_activated: Signal::new(),
        }
    }

    /// Start tracking a window.
    ///
    /// Returns `false` if the window is already tracked or already closed.
    pub fn register(self: &Arc<Self>, window: &Arc<Window>) -> bool {
        let id = window.id();
        if window.is_closed() || self.contains(id) {
            return false;
        }

        let tracker = Arc::downgrade(self);
        let activated = window.activated.connect(move |_| {
            if let Some(tracker) = tracker.upgrade() {
                tracker.notify_activated(id);
            }
        });
        let tracker = Arc::downgrade(self);
        let closed = window.closed.connect(move |_| {
            if let Some(tracker) = tracker.upgrade() {
                tracker.unregister(id);
            }
        });

        self.windows.write().insert(
            id,
            TrackedWindow {
                window: window.clone(),
                activated,
                closed,
            },
        );
        self.activation_order.write().insert(0, id);

        tracing::trace!(target: targets::TRACKER, window = %id, "window registered");
        self.window_registered.emit(id);
        true
    }

    /// Stop tracking a window.
    ///
    /// Returns the window if it was tracked.
    pub fn unregister(&self, id: WindowId) -> Option<Arc<Window>> {
        let tracked = self.windows.write().remove(&id)?;
        self.activation_order.write().retain(|&other| other != id);
        tracked.release();

        tracing::trace!(target: targets::TRACKER, window = %id, "window unregistered");
        self.window_unregistered.emit(id);
        Some(tracked.window)
    }

    /// Record that a tracked window became active.
    pub fn notify_activated(&self, id: WindowId) {
        if !self.contains(id) {
            return;
        }
        {
            let mut order = self.activation_order.write();
            order.retain(|&other| other != id);
            order.push(id);
        }
        self.window_activated.emit(id);
    }

    /// Get a tracked window by ID.
    pub fn get(&self, id: WindowId) -> Option<Arc<Window>> {
        self.windows.read().get(&id).map(|tracked| tracked.window.clone())
    }

    /// Check if a window is tracked.
    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.read().contains_key(&id)
    }

    /// Get the number of tracked windows.
    pub fn count(&self) -> usize {
        self.windows.read().len()
    }

    /// Check if no windows are tracked.
    pub fn is_empty(&self) -> bool {
        self.windows.read().is_empty()
    }

    /// Get all tracked window IDs, least recently activated first.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.activation_order.read().clone()
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Signal emitted when a window is registered.
    pub fn window_registered(&self) -> &Signal<WindowId> {
        &self.window_registered
    }

    /// Signal emitted when a window is unregistered, usually because it closed.
    pub fn window_unregistered(&self) -> &Signal<WindowId> {
        &self.window_unregistered
    }

    /// Signal emitted when a tracked window is activated.
    pub fn window_activated(&self) -> &Signal<WindowId> {
        &self.window_activated
    }
}

impl Default for WindowTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveWindowProvider for WindowTracker {
    fn active_window(&self) -> Option<Arc<Window>> {
        let order = self.activation_order.read();
        let windows = self.windows.read();
        order
            .iter()
            .rev()
            .filter_map(|id| windows.get(id))
            .find(|tracked| tracked.window.is_shown())
            .map(|tracked| tracked.window.clone())
    }
}

impl std::fmt::Debug for WindowTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowTracker")
            .field("windows", &self.window_ids())
            .finish()
    }
}

static_assertions::assert_impl_all!(WindowTracker: Send, Sync);
