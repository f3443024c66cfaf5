//! Window manager facade.
//!
//! The [`WindowManager`] is the entry point application code uses. It turns
//! a view-model into a shown window or a modal dialog: it resolves the view,
//! binds the title, picks an owner and a startup location, attaches a
//! [`WindowConductor`], and shows the window.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use casement::{ResolveError, View, ViewModel, Window, WindowManager};
//!
//! struct AboutViewModel;
//! impl ViewModel for AboutViewModel {}
//!
//! let manager = WindowManager::builder()
//!     .view_resolver(|_: &Arc<dyn ViewModel>| -> Result<View, ResolveError> {
//!         Ok(View::Window(Arc::new(Window::new())))
//!     })
//!     .build();
//!
//! manager.show_window(Arc::new(AboutViewModel), None).unwrap();
//! assert_eq!(manager.tracker().count(), 1);
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use casement_core::logging::targets;
use casement_core::{Dispatcher, TokioDispatcher};

use crate::capability::ViewModel;
use crate::conductor::WindowConductor;
use crate::config::WindowManagerConfig;
use crate::error::{Error, ResolveError, Result};
use crate::message_box::{
    DefaultMessageBoxFactory, MessageBoxFactory, MessageBoxParams, MessageBoxResult,
};
use crate::owner;
use crate::tracker::WindowTracker;
use crate::view::{ActiveWindowProvider, View, ViewResolver};
use crate::window::{StartupLocation, Window, WindowId};

/// Shows view-models as windows and dialogs.
pub struct WindowManager {
    resolver: Arc<dyn ViewResolver>,
    active_window: Arc<dyn ActiveWindowProvider>,
    message_box_factory: Arc<dyn MessageBoxFactory>,
    dispatcher: Arc<dyn Dispatcher>,
    tracker: Arc<WindowTracker>,
    config: WindowManagerConfig,
    conductors: Mutex<HashMap<WindowId, Weak<WindowConductor>>>,
}

impl WindowManager {
    /// Start building a window manager.
    pub fn builder() -> WindowManagerBuilder {
        WindowManagerBuilder::default()
    }

    /// The manager's configuration.
    pub fn config(&self) -> &WindowManagerConfig {
        &self.config
    }

    /// The tracker shown windows are registered with.
    pub fn tracker(&self) -> &Arc<WindowTracker> {
        &self.tracker
    }

    /// The conductor of an open window this manager showed.
    pub fn conductor_of(&self, window: WindowId) -> Option<Arc<WindowConductor>> {
        self.conductors.lock().get(&window).and_then(Weak::upgrade)
    }

    /// Show `view_model` in a non-modal window.
    ///
    /// If `owner` is given and its view is a window, that window becomes the
    /// new window's owner. A view-model whose window is already displayed
    /// has that window activated instead.
    pub fn show_window(
        &self,
        view_model: Arc<dyn ViewModel>,
        owner: Option<Arc<dyn ViewModel>>,
    ) -> Result<()> {
        let window = match self.create_window(&view_model, owner.as_ref(), false) {
            Err(Error::AlreadyShown { window, .. }) => {
                if let Some(conductor) = self.conductor_of(window) {
                    conductor.window().activate();
                }
                return Ok(());
            }
            created => created?,
        };
        window.show();
        window.activate();
        Ok(())
    }

    /// Show `view_model` in a modal dialog and wait for it to close.
    ///
    /// Resolves to the result the view-model closed the dialog with, or
    /// `None` if the dialog closed without one (for example through its
    /// native close button). Only this caller waits; the UI loop keeps
    /// running. Fails with [`Error::AlreadyShown`] if the view-model's window
    /// is already displayed.
    pub async fn show_dialog<T: Any + Send>(
        &self,
        view_model: Arc<dyn ViewModel>,
        owner: Option<Arc<dyn ViewModel>>,
    ) -> Result<Option<T>> {
        let window = self.create_window(&view_model, owner.as_ref(), true)?;
        let receiver = window.show_dialog();
        window.activate();
        drop(window);

        let value = receiver.await.map_err(|_| Error::DialogAbandoned)?;
        match value {
            None => Ok(None),
            Some(value) => value.downcast::<T>().map(Some).map_err(|_| Error::DialogResultType {
                expected: type_name::<T>(),
            }),
        }
    }

    /// Show a message box and wait for the user's choice.
    ///
    /// A box dismissed without a button reports its cancel button.
    pub async fn show_message_box(&self, params: MessageBoxParams) -> Result<MessageBoxResult> {
        let message_box = self
            .message_box_factory
            .create(params, &self.config.message_box);
        let view_model: Arc<dyn ViewModel> = message_box.clone();

        let chosen = self.show_dialog::<MessageBoxResult>(view_model, None).await?;
        Ok(chosen.unwrap_or_else(|| message_box.result()))
    }

    /// Resolve, configure and conduct a window for `view_model`. Does not
    /// show it.
    pub(crate) fn create_window(
        &self,
        view_model: &Arc<dyn ViewModel>,
        owner_view_model: Option<&Arc<dyn ViewModel>>,
        is_dialog: bool,
    ) -> Result<Arc<Window>> {
        let window = match self.resolve(view_model)? {
            View::Window(window) => window,
            View::Element { type_name } => {
                let err = Error::InvalidViewType {
                    view_model: view_model.type_name(),
                    view_type: type_name,
                };
                tracing::error!(target: targets::WINDOW_MANAGER, error = %err, "cannot show view");
                return Err(err);
            }
        };

        if let Some(conductor) = self.conductor_of(window.id())
            && !conductor.is_closed()
        {
            tracing::debug!(
                target: targets::WINDOW_MANAGER,
                window = %window.id(),
                view_model = view_model.type_name(),
                "window already has a conductor"
            );
            return Err(Error::AlreadyShown {
                view_model: view_model.type_name(),
                window: window.id(),
            });
        }

        let owner = owner::resolve_owner(
            &window,
            owner_view_model,
            is_dialog,
            self.config.infer_dialog_owner,
            self.resolver.as_ref(),
            self.active_window.as_ref(),
        );
        if let Some(owner) = &owner {
            owner::apply_owner(&window, owner)?;
        }

        if !window.has_title() {
            window.bind_title_to(view_model);
        }

        if self.config.center_unpositioned_windows
            && window.startup_location() == StartupLocation::Manual
            && !window.has_manual_position()
        {
            let location = if window.owner().is_some() {
                StartupLocation::CenterOwner
            } else {
                StartupLocation::CenterScreen
            };
            window.set_startup_location(location);
        }

        tracing::debug!(
            target: targets::WINDOW_MANAGER,
            window = %window.id(),
            view_model = view_model.type_name(),
            dialog = is_dialog,
            owner = ?window.owner().map(|owner| owner.id()),
            "displaying view-model in window"
        );

        if self.config.track_windows {
            self.tracker.register(&window);
        }

        let conductor =
            WindowConductor::attach(window.clone(), view_model.clone(), self.dispatcher.clone());
        {
            let mut conductors = self.conductors.lock();
            conductors.retain(|_, conductor| conductor.strong_count() > 0);
            conductors.insert(window.id(), Arc::downgrade(&conductor));
        }

        Ok(window)
    }

    fn resolve(&self, view_model: &Arc<dyn ViewModel>) -> std::result::Result<View, ResolveError> {
        self.resolver.resolve(view_model).inspect_err(|err| {
            tracing::error!(target: targets::WINDOW_MANAGER, error = %err, "view resolution failed");
        })
    }
}

impl fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(WindowManager: Send, Sync);

/// Builder for [`WindowManager`].
///
/// Only the view resolver is required. Without an explicit active-window
/// provider the manager's own [`WindowTracker`] answers that query.
#[derive(Default)]
pub struct WindowManagerBuilder {
    resolver: Option<Arc<dyn ViewResolver>>,
    active_window: Option<Arc<dyn ActiveWindowProvider>>,
    message_box_factory: Option<Arc<dyn MessageBoxFactory>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    tracker: Option<Arc<WindowTracker>>,
    config: WindowManagerConfig,
}

impl WindowManagerBuilder {
    /// Set the view resolver.
    pub fn view_resolver(mut self, resolver: impl ViewResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Set the active-window provider.
    pub fn active_window_provider(mut self, provider: impl ActiveWindowProvider + 'static) -> Self {
        self.active_window = Some(Arc::new(provider));
        self
    }

    /// Set the message box factory.
    pub fn message_box_factory(mut self, factory: impl MessageBoxFactory + 'static) -> Self {
        self.message_box_factory = Some(Arc::new(factory));
        self
    }

    /// Set the dispatcher pending close checks resume on.
    ///
    /// It must run continuations on the loop that delivers window events.
    /// The default binds to the Tokio runtime current at build time, which
    /// should be a current-thread runtime or a `LocalSet`.
    pub fn dispatcher(mut self, dispatcher: impl Dispatcher + 'static) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Share an existing window tracker.
    pub fn tracker(mut self, tracker: Arc<WindowTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: WindowManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the manager.
    ///
    /// Without a view resolver every show fails with a resolution error.
    pub fn build(self) -> WindowManager {
        let tracker = self.tracker.unwrap_or_default();
        let resolver: Arc<dyn ViewResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => {
                tracing::warn!(target: targets::WINDOW_MANAGER, "window manager built without a view resolver");
                Arc::new(
                    |view_model: &Arc<dyn ViewModel>| -> std::result::Result<View, ResolveError> {
                        Err(ResolveError::new(view_model.type_name(), "no view resolver configured"))
                    },
                )
            }
        };
        let active_window: Arc<dyn ActiveWindowProvider> = match self.active_window {
            Some(provider) => provider,
            None => tracker.clone(),
        };
        let message_box_factory: Arc<dyn MessageBoxFactory> = match self.message_box_factory {
            Some(factory) => factory,
            None => Arc::new(DefaultMessageBoxFactory),
        };
        let dispatcher: Arc<dyn Dispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(TokioDispatcher::current()),
        };

        WindowManager {
            resolver,
            active_window,
            message_box_factory,
            dispatcher,
            tracker,
            config: self.config,
            conductors: Mutex::new(HashMap::new()),
        }
    }
}

impl fmt::Debug for WindowManagerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManagerBuilder")
            .field("has_resolver", &self.resolver.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
