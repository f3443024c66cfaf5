//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use casement::capability::{
    Child, CloseCheck, CloseDelegate, Closeable, DisplayName, DisplayNameCell, ParentSlot,
    ScreenLifecycle, ScreenState, ScreenStatus, ViewModel,
};
use casement::message_box::{
    MessageBox, MessageBoxFactory, MessageBoxParams, MessageBoxViewModel,
};
use casement::{
    CloseError, DialogValue, MessageBoxConfig, OwnerError, ResolveError, View, ViewResolver,
    Window, WindowBackend, WindowId, WindowState,
};

/// Install a test subscriber once. Honors `RUST_LOG`.
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("casement=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Let spawned continuations run on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Backend
// ============================================================================

/// A native operation forwarded to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Show { window: WindowId, modal: bool },
    Activate(WindowId),
    Title(WindowId, String),
    Owner { window: WindowId, owner: WindowId },
    State(WindowId, WindowState),
    Close(WindowId),
}

/// Records every native operation; optionally refuses owner assignment.
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    refuse_owners: std::sync::atomic::AtomicBool,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing_owners() -> Arc<Self> {
        let backend = Self::default();
        backend.refuse_owners.store(true, Ordering::SeqCst);
        Arc::new(backend)
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().clone()
    }

    pub fn show_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, BackendCall::Show { .. }))
            .count()
    }

    pub fn close_count(&self, window: WindowId) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| **call == BackendCall::Close(window))
            .count()
    }
}

impl WindowBackend for RecordingBackend {
    fn show(&self, window: WindowId, modal: bool) {
        self.calls.lock().push(BackendCall::Show { window, modal });
    }

    fn activate(&self, window: WindowId) {
        self.calls.lock().push(BackendCall::Activate(window));
    }

    fn apply_title(&self, window: WindowId, title: &str) {
        self.calls.lock().push(BackendCall::Title(window, title.to_string()));
    }

    fn apply_owner(&self, window: WindowId, owner: WindowId) -> Result<(), OwnerError> {
        if self.refuse_owners.load(Ordering::SeqCst) {
            return Err(OwnerError::PlatformRefused("application is shutting down".into()));
        }
        self.calls.lock().push(BackendCall::Owner { window, owner });
        Ok(())
    }

    fn apply_state(&self, window: WindowId, state: WindowState) {
        self.calls.lock().push(BackendCall::State(window, state));
    }

    fn close(&self, window: WindowId) {
        self.calls.lock().push(BackendCall::Close(window));
    }
}

// ============================================================================
// Resolver
// ============================================================================

fn key(view_model: &Arc<dyn ViewModel>) -> usize {
    Arc::as_ptr(view_model) as *const () as usize
}

#[derive(Default)]
struct ResolverState {
    views: Mutex<HashMap<usize, View>>,
    resolutions: AtomicUsize,
}

/// Resolves each view-model to its own window, created on first use.
///
/// Views can be bound up front with [`TestResolver::bind`].
#[derive(Clone)]
pub struct TestResolver {
    backend: Arc<RecordingBackend>,
    state: Arc<ResolverState>,
}

impl TestResolver {
    pub fn new(backend: Arc<RecordingBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(ResolverState::default()),
        }
    }

    /// Resolve `view_model` to `view` from now on.
    pub fn bind(&self, view_model: &Arc<dyn ViewModel>, view: View) {
        self.state.views.lock().insert(key(view_model), view);
    }

    /// The window `view_model` resolved to, if any.
    pub fn window_for(&self, view_model: &Arc<dyn ViewModel>) -> Option<Arc<Window>> {
        self.state
            .views
            .lock()
            .get(&key(view_model))
            .and_then(|view| view.as_window().cloned())
    }

    pub fn resolutions(&self) -> usize {
        self.state.resolutions.load(Ordering::SeqCst)
    }
}

impl ViewResolver for TestResolver {
    fn resolve(&self, view_model: &Arc<dyn ViewModel>) -> Result<View, ResolveError> {
        self.state.resolutions.fetch_add(1, Ordering::SeqCst);
        let view = self
            .state
            .views
            .lock()
            .entry(key(view_model))
            .or_insert_with(|| {
                View::Window(Arc::new(Window::new().with_backend(self.backend.clone())))
            })
            .clone();
        Ok(view)
    }
}

// ============================================================================
// View-models
// ============================================================================

/// A view-model with no capabilities.
pub struct Plain;

impl ViewModel for Plain {}

/// A view-model with every capability. Close answers are scripted; once the
/// script runs out, closing is allowed.
pub struct Editor {
    name: DisplayNameCell,
    screen: ScreenLifecycle,
    parent: ParentSlot,
    answers: Mutex<VecDeque<CloseCheck>>,
    checks: AtomicUsize,
    transitions: Arc<Mutex<Vec<ScreenStatus>>>,
}

impl Editor {
    pub fn new(name: &str) -> Arc<Self> {
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let screen = ScreenLifecycle::new();
        let recorder = transitions.clone();
        screen
            .status_changed
            .connect(move |&status| recorder.lock().push(status));

        Arc::new(Self {
            name: DisplayNameCell::new(name),
            screen,
            parent: ParentSlot::new(),
            answers: Mutex::new(VecDeque::new()),
            checks: AtomicUsize::new(0),
            transitions,
        })
    }

    /// Answer the next close-permission check with `check`.
    pub fn answer_next(&self, check: CloseCheck) {
        self.answers.lock().push_back(check);
    }

    pub fn rename(&self, name: &str) {
        self.name.set(name);
    }

    pub fn status(&self) -> ScreenStatus {
        self.screen.status()
    }

    /// Every screen status transition, in order.
    pub fn transitions(&self) -> Vec<ScreenStatus> {
        self.transitions.lock().clone()
    }

    pub fn count(&self, status: ScreenStatus) -> usize {
        self.transitions
            .lock()
            .iter()
            .filter(|&&other| other == status)
            .count()
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    /// Ask the closing delegate to close this view-model.
    pub fn request_close(
        &self,
        result: Option<DialogValue>,
    ) -> BoxFuture<'static, Result<bool, CloseError>> {
        self.parent.request_close(self, result)
    }
}

impl ViewModel for Editor {
    fn as_closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }

    fn as_child(&self) -> Option<&dyn Child> {
        Some(self)
    }

    fn as_screen_state(&self) -> Option<&dyn ScreenState> {
        Some(&self.screen)
    }

    fn as_display_name(&self) -> Option<&dyn DisplayName> {
        Some(&self.name)
    }
}

impl Closeable for Editor {
    fn can_close(&self) -> CloseCheck {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(CloseCheck::allow)
    }
}

impl Child for Editor {
    fn parent(&self) -> Option<Arc<dyn CloseDelegate>> {
        self.parent.get()
    }

    fn set_parent(&self, parent: Weak<dyn CloseDelegate>) {
        self.parent.set(parent);
    }
}

// ============================================================================
// Message boxes
// ============================================================================

/// Creates the default message box and keeps a handle to it so tests can
/// click its buttons.
#[derive(Clone, Default)]
pub struct CapturingMessageBoxFactory {
    created: Arc<Mutex<Option<Arc<MessageBoxViewModel>>>>,
}

impl CapturingMessageBoxFactory {
    pub fn last(&self) -> Option<Arc<MessageBoxViewModel>> {
        self.created.lock().clone()
    }
}

impl MessageBoxFactory for CapturingMessageBoxFactory {
    fn create(&self, params: MessageBoxParams, config: &MessageBoxConfig) -> Arc<dyn MessageBox> {
        let message_box = Arc::new(MessageBoxViewModel::new(params, &config.labels));
        *self.created.lock() = Some(message_box.clone());
        message_box
    }
}
