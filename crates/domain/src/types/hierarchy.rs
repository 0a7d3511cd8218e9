//! Organization hierarchy types returned by DingTalk

use serde::{Deserialize, Serialize};

/// Scope the app is authorized for, fetched once per sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthScope {
    /// User fields the app may read
    pub auth_user_field: Vec<String>,
    /// Department ids the app is authorized for; `[1]` means the whole
    /// organization
    pub authed_departments: Vec<i64>,
    /// Individually authorized user ids
    pub authed_users: Vec<String>,
}

/// Department node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub ding_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// Department member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub ding_userid: String,
    pub name: String,
    pub department_id: i64,
}

/// One page of department members
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<Employee>,
    /// Cursor for the next page, `None` when exhausted
    pub next_cursor: Option<i64>,
}
