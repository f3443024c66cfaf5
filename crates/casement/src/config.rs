//! Window manager configuration.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! changes:
//!
//! ```toml
//! infer_dialog_owner = true
//! center_unpositioned_windows = false
//!
//! [message_box.labels]
//! yes = "Ja"
//! no = "Nein"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::message_box::MessageBoxResult;

/// Configuration for a [`WindowManager`](crate::WindowManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowManagerConfig {
    /// Give dialogs without an explicit owner the active window as owner.
    pub infer_dialog_owner: bool,
    /// Center windows the caller has not positioned: on their owner if they
    /// have one, otherwise on the screen.
    pub center_unpositioned_windows: bool,
    /// Register shown windows with the manager's window tracker.
    pub track_windows: bool,
    /// Message box presentation.
    pub message_box: MessageBoxConfig,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            infer_dialog_owner: true,
            center_unpositioned_windows: true,
            track_windows: true,
            message_box: MessageBoxConfig::default(),
        }
    }
}

impl WindowManagerConfig {
    /// Enable or disable dialog owner inference.
    pub fn with_infer_dialog_owner(mut self, enabled: bool) -> Self {
        self.infer_dialog_owner = enabled;
        self
    }

    /// Enable or disable centering of unpositioned windows.
    pub fn with_center_unpositioned_windows(mut self, enabled: bool) -> Self {
        self.center_unpositioned_windows = enabled;
        self
    }

    /// Enable or disable window tracking.
    pub fn with_track_windows(mut self, enabled: bool) -> Self {
        self.track_windows = enabled;
        self
    }

    /// Set the message box button labels.
    pub fn with_button_labels(mut self, labels: ButtonLabels) -> Self {
        self.message_box.labels = labels;
        self
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Message box presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBoxConfig {
    /// Button captions.
    pub labels: ButtonLabels,
}

/// Captions for message box buttons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonLabels {
    pub ok: String,
    pub cancel: String,
    pub yes: String,
    pub no: String,
}

impl Default for ButtonLabels {
    fn default() -> Self {
        Self {
            ok: "OK".to_string(),
            cancel: "Cancel".to_string(),
            yes: "Yes".to_string(),
            no: "No".to_string(),
        }
    }
}

impl ButtonLabels {
    /// The caption for the button that produces `result`.
    pub fn label_for(&self, result: MessageBoxResult) -> &str {
        match result {
            MessageBoxResult::Ok => &self.ok,
            MessageBoxResult::Cancel => &self.cancel,
            MessageBoxResult::Yes => &self.yes,
            MessageBoxResult::No => &self.no,
            MessageBoxResult::None => "",
        }
    }
}
