//! Sync audit log queries

use dingbridge_domain::{AuditLogRecord, Result};

use super::execute_blocking;
use crate::context::AppContext;

/// Most recent sync audit entries for `app_id`, newest first.
pub fn list_logs(ctx: &AppContext, app_id: i64, limit: usize) -> Result<Vec<AuditLogRecord>> {
    execute_blocking(ctx, "logs::list_logs", ctx.audit_logs.list_for_app(app_id, limit))
}
