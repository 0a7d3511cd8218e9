//! Port interfaces for app records and audit history

use async_trait::async_trait;
use dingbridge_domain::{AuditLogRecord, DingApp, NewDingApp, Result};

/// Persistence for configured DingTalk apps
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Store a validated app and return it with its assigned id
    async fn create(&self, app: NewDingApp) -> Result<DingApp>;

    /// Fetch one app; `NotFound` if the id is unknown
    async fn get(&self, id: i64) -> Result<DingApp>;

    async fn list(&self) -> Result<Vec<DingApp>>;
}

/// Read access to persisted sync audit entries
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Entries for `app_id`, newest first, at most `limit`
    async fn list_for_app(&self, app_id: i64, limit: usize) -> Result<Vec<AuditLogRecord>>;
}
