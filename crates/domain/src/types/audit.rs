//! Audit log types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One run's audit record, composed in memory and written once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub organization_id: i64,
    pub app_id: i64,
    pub detail: String,
}

/// Audit entry as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogRecord {
    pub id: i64,
    pub entry: AuditLogEntry,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}
