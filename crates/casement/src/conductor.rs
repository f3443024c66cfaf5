//! Window/screen lifecycle conductor.
//!
//! One [`WindowConductor`] is attached to every window the window manager
//! shows. It binds the view-model's optional capabilities to the window's
//! native lifecycle:
//!
//! - minimizing and restoring the window deactivates and activates a
//!   [`ScreenState`](crate::capability::ScreenState) view-model,
//! - a native close attempt asks a [`Closeable`] view-model for permission,
//!   cancelling the close while an asynchronous answer is pending,
//! - a [`Child`](crate::capability::Child) view-model gets the conductor as
//!   its closing delegate, so it can close its own window with a result,
//! - when the window closes, every subscription is released exactly once
//!   and the view-model is told it closed.
//!
//! # State machine
//!
//! ```text
//!            minimized            native close, check pending
//!   Active ------------> Inactive -----------------------------+
//!     ^  <------------              |                          v
//!     |     restored                |                    ClosePending
//!     |                             |                          |
//!     +------------- denied --------+--------------------------+
//!                                   |                          |
//!                                 closed <------- granted -----+
//!                                   v
//!                                Closed
//! ```
//!
//! The native close path and the view-model close path both end in
//! [`WindowConductor::teardown`], which runs at most once.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;

use casement_core::logging::targets;
use casement_core::{ConnectionId, Dispatcher, Property, Signal};

use crate::capability::{Capabilities, CloseDelegate, Closeable, ViewModel};
use crate::error::CloseError;
use crate::window::{ClosingEvent, DialogValue, Window, WindowState};

/// Lifecycle state of a [`WindowConductor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConductorState {
    /// The window is on screen and the view-model is active.
    #[default]
    Active,
    /// The window is minimized and the view-model deactivated.
    Inactive,
    /// A close-permission check is in flight; native close attempts are
    /// cancelled until it resolves.
    ClosePending,
    /// The window closed and every subscription was released. Terminal.
    Closed,
}

#[derive(Debug, Default)]
struct Subscriptions {
    state_changed: Option<ConnectionId>,
    closing: Option<ConnectionId>,
    closed: Option<ConnectionId>,
}

impl Subscriptions {
    fn release(self, window: &Window) {
        if let Some(id) = self.state_changed {
            window.state_changed.disconnect(id);
        }
        if let Some(id) = self.closing {
            window.closing.disconnect(id);
        }
        if let Some(id) = self.closed {
            window.closed.disconnect(id);
        }
    }
}

/// Where the closing handler is in dispatching a pending check.
///
/// Read and written under one lock, so a continuation finishing on another
/// worker either hands its answer to the handler or waits until the
/// handler has entered `ClosePending`.
#[derive(Debug, Default)]
enum InlineDispatch {
    #[default]
    Idle,
    Dispatching,
    Answered(Result<bool, CloseError>),
}

/// Binds a view-model's lifecycle to its window's.
///
/// Created by [`WindowConductor::attach`]. The window's signal connections
/// keep the conductor alive until the window closes.
pub struct WindowConductor {
    this: Weak<WindowConductor>,
    window: Arc<Window>,
    view_model: Arc<dyn ViewModel>,
    dispatcher: Arc<dyn Dispatcher>,
    state: Property<ConductorState>,
    /// State to return to when a pending close is denied.
    resume_state: Property<ConductorState>,
    subscriptions: Mutex<Subscriptions>,
    closed: AtomicBool,
    inline: Mutex<InlineDispatch>,

    /// Emitted on every state transition.
    pub state_changed: Signal<ConductorState>,
    /// Emitted when a pending close-permission check fails. There is no
    /// caller left to return the fault to.
    pub close_failed: Signal<CloseError>,
}

impl WindowConductor {
    /// Attach a conductor to `window` for `view_model`.
    ///
    /// Installs the conductor as the view-model's closing delegate, activates
    /// the view-model, and subscribes to the window events the view-model's
    /// capabilities call for.
    pub fn attach(
        window: Arc<Window>,
        view_model: Arc<dyn ViewModel>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Arc<Self> {
        let conductor = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            window,
            view_model,
            dispatcher,
            state: Property::new(ConductorState::Active),
            resume_state: Property::new(ConductorState::Active),
            subscriptions: Mutex::new(Subscriptions::default()),
            closed: AtomicBool::new(false),
            inline: Mutex::new(InlineDispatch::Idle),
            state_changed: Signal::new(),
            close_failed: Signal::new(),
        });

        if let Some(child) = conductor.view_model.as_child() {
            let delegate: Weak<dyn CloseDelegate> = conductor.this.clone();
            child.set_parent(delegate);
        }
        if let Some(screen) = conductor.view_model.as_screen_state() {
            screen.activate();
        }
        conductor.subscribe();

        tracing::debug!(
            target: targets::CONDUCTOR,
            window = %conductor.window.id(),
            view_model = conductor.view_model.type_name(),
            capabilities = %Capabilities::probe(conductor.view_model.as_ref()),
            "conductor attached"
        );
        conductor
    }

    fn subscribe(self: &Arc<Self>) {
        let mut subscriptions = self.subscriptions.lock();

        if self.view_model.as_screen_state().is_some() {
            let conductor = self.clone();
            subscriptions.state_changed = Some(
                self.window
                    .state_changed
                    .connect(move |&state| conductor.on_window_state_changed(state)),
            );
        }
        if self.view_model.as_closeable().is_some() {
            subscriptions.closing = Some(self.connect_closing());
        }
        let conductor = self.clone();
        subscriptions.closed = Some(self.window.closed.connect(move |_| {
            conductor.teardown();
        }));
    }

    fn connect_closing(self: &Arc<Self>) -> ConnectionId {
        let conductor = self.clone();
        self.window
            .closing
            .connect(move |event| conductor.on_window_closing(event))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current state.
    pub fn state(&self) -> ConductorState {
        self.state.get()
    }

    /// Check whether the conductor has torn down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The conducted window.
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// The conducted view-model.
    pub fn view_model(&self) -> &Arc<dyn ViewModel> {
        &self.view_model
    }

    fn transition(&self, state: ConductorState) {
        if let Some(previous) = self.state.replace(state) {
            tracing::debug!(
                target: targets::CONDUCTOR,
                window = %self.window.id(),
                from = ?previous,
                to = ?state,
                "conductor state changed"
            );
            self.state_changed.emit(state);
        }
    }

    /// Project a window state onto the conductor, deferring it while a close
    /// is pending.
    fn settle(&self, state: ConductorState) {
        if self.state() == ConductorState::ClosePending {
            self.resume_state.set(state);
        } else {
            self.transition(state);
        }
    }

    fn enter_close_pending(&self) {
        let current = self.state();
        if current != ConductorState::ClosePending {
            self.resume_state.set(current);
            self.transition(ConductorState::ClosePending);
        }
    }

    fn leave_close_pending(&self) {
        if self.state() == ConductorState::ClosePending {
            self.transition(self.resume_state.get());
        }
    }

    // =========================================================================
    // Window events
    // =========================================================================

    fn on_window_state_changed(&self, state: WindowState) {
        if self.is_closed() {
            return;
        }
        let Some(screen) = self.view_model.as_screen_state() else {
            return;
        };
        if state.is_minimized() {
            screen.deactivate();
            self.settle(ConductorState::Inactive);
        } else {
            screen.activate();
            self.settle(ConductorState::Active);
        }
    }

    fn on_window_closing(self: &Arc<Self>, event: &ClosingEvent) {
        if event.is_cancelled() || self.is_closed() {
            return;
        }
        if self.state() == ConductorState::ClosePending {
            tracing::debug!(
                target: targets::CONDUCTOR,
                window = %self.window.id(),
                "close permission check already pending; cancelling close"
            );
            event.cancel();
            return;
        }
        let Some(mut check) = self.view_model.as_closeable().map(Closeable::can_close) else {
            return;
        };

        if let Some(answer) = (&mut check).now_or_never() {
            self.answer_native_close(event, answer);
            return;
        }

        *self.inline.lock() = InlineDispatch::Dispatching;
        let conductor = self.clone();
        self.dispatcher.spawn(
            async move {
                let answer = check.await;
                conductor.finish_pending_close(answer);
            }
            .boxed(),
        );

        let mut inline = self.inline.lock();
        match std::mem::take(&mut *inline) {
            InlineDispatch::Answered(answer) => {
                drop(inline);
                self.answer_native_close(event, answer);
            }
            InlineDispatch::Idle | InlineDispatch::Dispatching => {
                // Held until ClosePending is entered; a continuation on
                // another worker waits for it.
                event.cancel();
                self.enter_close_pending();
                drop(inline);
                tracing::debug!(
                    target: targets::CONDUCTOR,
                    window = %self.window.id(),
                    "close permission check pending; close deferred"
                );
            }
        }
    }

    fn answer_native_close(&self, event: &ClosingEvent, answer: Result<bool, CloseError>) {
        match answer {
            Ok(true) => {}
            Ok(false) => {
                event.cancel();
                self.log_denied();
            }
            Err(err) => event.fail(err),
        }
    }

    fn finish_pending_close(self: &Arc<Self>, answer: Result<bool, CloseError>) {
        {
            let mut inline = self.inline.lock();
            if matches!(*inline, InlineDispatch::Dispatching) {
                *inline = InlineDispatch::Answered(answer);
                return;
            }
        }
        if self.is_closed() {
            return;
        }

        match answer {
            Ok(true) => {
                let closing = self.subscriptions.lock().closing.take();
                if let Some(id) = closing {
                    self.window.closing.disconnect(id);
                }

                let outcome = self.window.close();
                if self.is_closed() {
                    return;
                }

                // Some other handler kept the window open.
                self.subscriptions.lock().closing = Some(self.connect_closing());
                self.leave_close_pending();
                match outcome {
                    Err(err) => self.report_fault(err),
                    Ok(_) => tracing::info!(
                        target: targets::CONDUCTOR,
                        window = %self.window.id(),
                        "close permitted but cancelled elsewhere"
                    ),
                }
            }
            Ok(false) => {
                self.leave_close_pending();
                self.log_denied();
            }
            Err(err) => {
                self.leave_close_pending();
                self.report_fault(err);
            }
        }
    }

    fn log_denied(&self) {
        tracing::info!(
            target: targets::CONDUCTOR,
            window = %self.window.id(),
            view_model = self.view_model.type_name(),
            "close cancelled by view-model"
        );
    }

    fn report_fault(&self, err: CloseError) {
        tracing::error!(
            target: targets::CONDUCTOR,
            window = %self.window.id(),
            error = %err,
            "close permission check failed"
        );
        self.close_failed.emit(err);
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release every subscription and tell the view-model it closed.
    ///
    /// Runs at most once; later calls return `false` and do nothing.
    pub fn teardown(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        subscriptions.release(&self.window);

        if let Some(screen) = self.view_model.as_screen_state() {
            screen.close();
        }
        self.transition(ConductorState::Closed);
        tracing::debug!(target: targets::CONDUCTOR, window = %self.window.id(), "conductor closed");
        true
    }

    async fn close_requested_by_view_model(
        self: Arc<Self>,
        result: Option<DialogValue>,
    ) -> Result<bool, CloseError> {
        if self.is_closed() {
            return Ok(false);
        }
        if self.state() == ConductorState::ClosePending {
            tracing::debug!(
                target: targets::CONDUCTOR,
                window = %self.window.id(),
                "close requested while a permission check is pending"
            );
            return Ok(false);
        }

        let check = self.view_model.as_closeable().map(Closeable::can_close);
        if let Some(mut check) = check {
            let answer = match (&mut check).now_or_never() {
                Some(answer) => answer,
                None => {
                    self.enter_close_pending();
                    let answer = check.await;
                    self.leave_close_pending();
                    answer
                }
            };
            if !answer? {
                self.log_denied();
                return Ok(false);
            }
        }
        if self.is_closed() {
            return Ok(false);
        }

        self.teardown();
        let closed = self.window.close_with_result(result)?;
        if !closed {
            tracing::warn!(
                target: targets::CONDUCTOR,
                window = %self.window.id(),
                "window stayed open after its view-model closed"
            );
        }
        Ok(closed)
    }
}

impl CloseDelegate for WindowConductor {
    fn close_item(
        &self,
        item: &dyn ViewModel,
        result: Option<DialogValue>,
    ) -> BoxFuture<'static, Result<bool, CloseError>> {
        if !std::ptr::addr_eq(item, Arc::as_ptr(&self.view_model)) {
            tracing::warn!(
                target: targets::CONDUCTOR,
                window = %self.window.id(),
                requested = item.type_name(),
                conducted = self.view_model.type_name(),
                "close requested for a view-model this conductor does not manage; ignoring"
            );
            return future::ready(Ok(false)).boxed();
        }
        match self.this.upgrade() {
            Some(conductor) => conductor.close_requested_by_view_model(result).boxed(),
            None => future::ready(Ok(false)).boxed(),
        }
    }
}

impl fmt::Debug for WindowConductor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowConductor")
            .field("window", &self.window.id())
            .field("view_model", &self.view_model.type_name())
            .field("state", &self.state())
            .finish()
    }
}

static_assertions::assert_impl_all!(WindowConductor: Send, Sync);
