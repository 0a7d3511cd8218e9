//! User-facing status notifications

use serde::{Deserialize, Serialize};

/// Small fire-and-forget status message
///
/// `warning` marks failure severity; informational messages leave it unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub title: String,
    pub message: String,
    pub warning: bool,
}

impl NotificationMessage {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), warning: false }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), warning: true }
    }
}
