//! Work-notification message types
//!
//! A [`MessageTarget`] can only be constructed when at least one user or
//! department is addressed, so an empty send never reaches the client.

use serde::{Deserialize, Serialize};

use crate::{DingBridgeError, Result};

/// Who receives a work notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipients {
    /// Explicit DingTalk user ids
    Users(Vec<String>),
    /// Every user visible to the app
    AllUsers,
}

impl Recipients {
    /// Sentinel accepted from callers to mean [`Recipients::AllUsers`].
    pub const ALL_USERS_SENTINEL: &'static str = "to_all_user";

    /// Build recipients from caller input, honouring the all-users sentinel.
    pub fn from_user_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.len() == 1 && ids[0] == Self::ALL_USERS_SENTINEL {
            return Self::AllUsers;
        }
        Self::Users(ids)
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Users(ids) if ids.is_empty())
    }
}

/// Validated addressing for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageTarget {
    recipients: Recipients,
    departments: Vec<String>,
}

impl MessageTarget {
    /// # Errors
    ///
    /// Returns [`DingBridgeError::Validation`] when neither users nor
    /// departments are addressed.
    pub fn new(recipients: Recipients, departments: Vec<String>) -> Result<Self> {
        if recipients.is_empty() && departments.is_empty() {
            return Err(DingBridgeError::Validation(
                "Please select the user or department to send the message!".into(),
            ));
        }
        Ok(Self { recipients, departments })
    }

    pub fn recipients(&self) -> &Recipients {
        &self.recipients
    }

    /// Department ids that will actually be sent. Empty when addressing all
    /// users, since the platform ignores departments in that case.
    pub fn effective_departments(&self) -> &[String] {
        match self.recipients {
            Recipients::AllUsers => &[],
            Recipients::Users(_) => &self.departments,
        }
    }

    pub fn is_all_users(&self) -> bool {
        matches!(self.recipients, Recipients::AllUsers)
    }
}

/// Message body plus addressing
///
/// `msg` follows DingTalk's message-type schema (`msgtype` + body object) and
/// is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub target: MessageTarget,
    pub msg: serde_json::Value,
}

impl OutgoingMessage {
    pub fn new(target: MessageTarget, msg: serde_json::Value) -> Result<Self> {
        if msg.is_null() || msg.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(DingBridgeError::Validation("msg is required".into()));
        }
        Ok(Self { target, msg })
    }
}
