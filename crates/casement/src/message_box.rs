//! Message boxes.
//!
//! A message box is an ordinary dialog view-model. The window manager asks a
//! [`MessageBoxFactory`] for one, shows it as a dialog through the regular
//! view resolver, and returns the button the user chose.
//!
//! The built-in [`MessageBoxViewModel`] lays out one button per result of
//! the requested [`MessageBoxButtons`] set, left to right.

use std::fmt;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;

use casement_core::logging::targets;

use crate::capability::{
    Child, CloseCheck, CloseDelegate, Closeable, DisplayName, DisplayNameCell, ParentSlot,
    ScreenLifecycle, ScreenState, ViewModel,
};
use crate::config::{ButtonLabels, MessageBoxConfig};
use crate::error::CloseError;
use crate::window::DialogValue;

/// The buttons a message box offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageBoxButtons {
    #[default]
    Ok,
    OkCancel,
    YesNo,
    YesNoCancel,
}

impl MessageBoxButtons {
    /// The results of the buttons in this set, left to right.
    pub fn results(self) -> &'static [MessageBoxResult] {
        match self {
            Self::Ok => &[MessageBoxResult::Ok],
            Self::OkCancel => &[MessageBoxResult::Ok, MessageBoxResult::Cancel],
            Self::YesNo => &[MessageBoxResult::Yes, MessageBoxResult::No],
            Self::YesNoCancel => &[
                MessageBoxResult::Yes,
                MessageBoxResult::No,
                MessageBoxResult::Cancel,
            ],
        }
    }
}

/// The icon shown next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageBoxIcon {
    #[default]
    None,
    Information,
    Warning,
    Error,
    Question,
}

/// The button a user chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageBoxResult {
    /// No button, used to request the set's own default or cancel button.
    #[default]
    None,
    Ok,
    Cancel,
    Yes,
    No,
}

/// Reading direction of the message box content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Alignment of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Everything a message box is configured with.
///
/// # Example
///
/// ```
/// use casement::message_box::{MessageBoxButtons, MessageBoxParams, MessageBoxResult};
///
/// let params = MessageBoxParams::new("Discard unsaved changes?")
///     .with_caption("Editor")
///     .with_buttons(MessageBoxButtons::YesNo)
///     .with_default_result(MessageBoxResult::No);
/// assert_eq!(params.default_result, MessageBoxResult::No);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageBoxParams {
    pub text: String,
    pub caption: Option<String>,
    pub buttons: MessageBoxButtons,
    pub icon: MessageBoxIcon,
    pub default_result: MessageBoxResult,
    pub cancel_result: MessageBoxResult,
    pub flow_direction: FlowDirection,
    pub text_alignment: TextAlignment,
}

impl MessageBoxParams {
    /// A message box with an OK button.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_buttons(mut self, buttons: MessageBoxButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_icon(mut self, icon: MessageBoxIcon) -> Self {
        self.icon = icon;
        self
    }

    /// The result whose button is focused initially.
    pub fn with_default_result(mut self, result: MessageBoxResult) -> Self {
        self.default_result = result;
        self
    }

    /// The result reported when the box is dismissed without a button.
    pub fn with_cancel_result(mut self, result: MessageBoxResult) -> Self {
        self.cancel_result = result;
        self
    }

    pub fn with_flow_direction(mut self, direction: FlowDirection) -> Self {
        self.flow_direction = direction;
        self
    }

    pub fn with_text_alignment(mut self, alignment: TextAlignment) -> Self {
        self.text_alignment = alignment;
        self
    }
}

/// A message box view-model.
pub trait MessageBox: ViewModel {
    /// The button the user chose, or the cancel button if the box was
    /// dismissed another way.
    fn result(&self) -> MessageBoxResult;
}

/// Produces message box view-models.
pub trait MessageBoxFactory: Send + Sync {
    /// Create a message box for `params`.
    fn create(&self, params: MessageBoxParams, config: &MessageBoxConfig) -> Arc<dyn MessageBox>;
}

/// Creates [`MessageBoxViewModel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageBoxFactory;

impl MessageBoxFactory for DefaultMessageBoxFactory {
    fn create(&self, params: MessageBoxParams, config: &MessageBoxConfig) -> Arc<dyn MessageBox> {
        Arc::new(MessageBoxViewModel::new(params, &config.labels))
    }
}

/// One button of a message box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBoxButton {
    pub result: MessageBoxResult,
    pub label: String,
}

/// The built-in message box view-model.
pub struct MessageBoxViewModel {
    text: String,
    icon: MessageBoxIcon,
    buttons: Vec<MessageBoxButton>,
    default_result: MessageBoxResult,
    cancel_result: MessageBoxResult,
    flow_direction: FlowDirection,
    text_alignment: TextAlignment,
    caption: Option<DisplayNameCell>,
    parent: ParentSlot,
    screen: ScreenLifecycle,
    clicked: Mutex<Option<MessageBoxResult>>,
}

impl MessageBoxViewModel {
    /// Build the view-model, labelling buttons with `labels`.
    ///
    /// The default button is `params.default_result` if the set offers it,
    /// otherwise the leftmost button. The cancel button is
    /// `params.cancel_result` if offered, otherwise the rightmost button.
    pub fn new(params: MessageBoxParams, labels: &ButtonLabels) -> Self {
        let results = params.buttons.results();
        let buttons: Vec<_> = results
            .iter()
            .map(|&result| MessageBoxButton {
                result,
                label: labels.label_for(result).to_string(),
            })
            .collect();

        let offered = |result: MessageBoxResult| results.contains(&result);
        let default_result = if offered(params.default_result) {
            params.default_result
        } else {
            results.first().copied().unwrap_or_default()
        };
        let cancel_result = if offered(params.cancel_result) {
            params.cancel_result
        } else {
            results.last().copied().unwrap_or_default()
        };

        Self {
            text: params.text,
            icon: params.icon,
            buttons,
            default_result,
            cancel_result,
            flow_direction: params.flow_direction,
            text_alignment: params.text_alignment,
            caption: params.caption.map(DisplayNameCell::new),
            parent: ParentSlot::new(),
            screen: ScreenLifecycle::new(),
            clicked: Mutex::new(None),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn icon(&self) -> MessageBoxIcon {
        self.icon
    }

    /// The buttons, left to right.
    pub fn buttons(&self) -> &[MessageBoxButton] {
        &self.buttons
    }

    pub fn default_result(&self) -> MessageBoxResult {
        self.default_result
    }

    pub fn cancel_result(&self) -> MessageBoxResult {
        self.cancel_result
    }

    pub fn flow_direction(&self) -> FlowDirection {
        self.flow_direction
    }

    pub fn text_alignment(&self) -> TextAlignment {
        self.text_alignment
    }

    /// The activation status of the box.
    pub fn screen(&self) -> &ScreenLifecycle {
        &self.screen
    }

    /// The user pressed the button for `result`; close with it.
    pub fn button_clicked(&self, result: MessageBoxResult) -> BoxFuture<'static, Result<bool, CloseError>> {
        if !self.buttons.iter().any(|button| button.result == result) {
            tracing::warn!(
                target: targets::MESSAGE_BOX,
                ?result,
                "message box has no button for this result"
            );
            return future::ready(Ok(false)).boxed();
        }

        tracing::debug!(target: targets::MESSAGE_BOX, ?result, "message box button clicked");
        *self.clicked.lock() = Some(result);
        self.parent.request_close(self, Some(DialogValue::new(result)))
    }

    /// Dismiss the box with its cancel button.
    pub fn cancel(&self) -> BoxFuture<'static, Result<bool, CloseError>> {
        self.button_clicked(self.cancel_result)
    }
}

impl ViewModel for MessageBoxViewModel {
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
        self.caption.as_ref().map(|caption| caption as &dyn DisplayName)
    }
}

impl Closeable for MessageBoxViewModel {
    fn can_close(&self) -> CloseCheck {
        CloseCheck::allow()
    }
}

impl Child for MessageBoxViewModel {
    fn parent(&self) -> Option<Arc<dyn CloseDelegate>> {
        self.parent.get()
    }

    fn set_parent(&self, parent: std::sync::Weak<dyn CloseDelegate>) {
        self.parent.set(parent);
    }
}

impl MessageBox for MessageBoxViewModel {
    fn result(&self) -> MessageBoxResult {
        self.clicked.lock().unwrap_or(self.cancel_result)
    }
}

impl fmt::Debug for MessageBoxViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBoxViewModel")
            .field("text", &self.text)
            .field("caption", &self.caption.as_ref().map(DisplayName::display_name))
            .field("buttons", &self.buttons)
            .field("default_result", &self.default_result)
            .field("cancel_result", &self.cancel_result)
            .finish()
    }
}
