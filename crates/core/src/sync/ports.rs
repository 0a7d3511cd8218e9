//! Port interfaces for sync operations

use async_trait::async_trait;
use dingbridge_domain::{
    AuditLogEntry, AuthScope, Department, DingApp, Employee, NotificationMessage, Result,
};

use crate::dingtalk::ports::DingTalkApi;

/// Isolated unit of work owned by one sync run.
///
/// Writes become visible only after [`SyncSession::commit`]. Dropping a
/// session without committing rolls it back and releases its connection.
#[async_trait]
pub trait SyncSession: Send {
    /// Identity the session acts as
    fn acting_user(&self) -> &str;

    /// Insert or refresh a department of `app_id`
    async fn upsert_department(&mut self, app_id: i64, department: &Department) -> Result<()>;

    /// Insert or refresh a department member of `app_id`
    async fn upsert_employee(&mut self, app_id: i64, employee: &Employee) -> Result<()>;

    /// Append the run's audit entry
    async fn append_audit_log(&mut self, entry: &AuditLogEntry) -> Result<()>;

    /// Commit every write made through this session
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Opens brand-new sessions. Each call must hand out a connection that is not
/// shared with any other session.
pub trait SessionProvider: Send + Sync {
    fn open_session(&self, acting_user: &str) -> Result<Box<dyn SyncSession>>;
}

/// Counts reported by a hierarchy sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchySummary {
    pub departments: usize,
    pub employees: usize,
}

/// Walks the remote organization and writes it through the session.
#[async_trait]
pub trait HierarchySync: Send + Sync {
    async fn sync(
        &self,
        session: &mut dyn SyncSession,
        app: &DingApp,
        client: &dyn DingTalkApi,
        scopes: &AuthScope,
    ) -> Result<HierarchySummary>;
}

/// Best-effort delivery of status messages to a user's session.
pub trait NotificationChannel: Send + Sync {
    fn send(&self, recipient: &str, event: &str, message: NotificationMessage);
}
