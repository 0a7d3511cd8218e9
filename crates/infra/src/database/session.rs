//! Isolated write sessions for sync runs
//!
//! Each session owns one pooled connection and one open transaction. Writes
//! become visible to other connections only on commit; a session dropped
//! without committing rolls back.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dingbridge_core::{SessionProvider, SyncSession};
use dingbridge_domain::{AuditLogEntry, Department, Employee, Result};
use rusqlite::params;
use tracing::{debug, warn};

use super::manager::{map_sql_error, DbManager, SqliteConnection};

const UPSERT_DEPARTMENT_SQL: &str = "INSERT INTO departments (app_id, ding_id, name, parent_id, synced_by, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT(app_id, ding_id) DO UPDATE SET
        name = excluded.name,
        parent_id = excluded.parent_id,
        synced_by = excluded.synced_by,
        updated_at = excluded.updated_at";

const UPSERT_EMPLOYEE_SQL: &str = "INSERT INTO employees (app_id, ding_userid, department_id, name, synced_by, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
     ON CONFLICT(app_id, ding_userid, department_id) DO UPDATE SET
        name = excluded.name,
        synced_by = excluded.synced_by,
        updated_at = excluded.updated_at";

const INSERT_AUDIT_SQL: &str = "INSERT INTO ding_logs (company_id, ding_app_id, detail, created_by, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// Transaction-scoped session on a dedicated connection
pub struct SqliteSyncSession {
    conn: SqliteConnection,
    acting_user: String,
    committed: bool,
}

impl SqliteSyncSession {
    /// Open a transaction on `conn`.
    pub fn begin(conn: SqliteConnection, acting_user: &str) -> Result<Self> {
        conn.execute_batch("BEGIN").map_err(map_sql_error)?;
        Ok(Self { conn, acting_user: acting_user.to_string(), committed: false })
    }
}

#[async_trait]
impl SyncSession for SqliteSyncSession {
    fn acting_user(&self) -> &str {
        &self.acting_user
    }

    async fn upsert_department(&mut self, app_id: i64, department: &Department) -> Result<()> {
        self.conn
            .execute(
                UPSERT_DEPARTMENT_SQL,
                params![
                    app_id,
                    department.ding_id,
                    department.name,
                    department.parent_id,
                    self.acting_user,
                    Utc::now().timestamp()
                ],
            )
            .map_err(map_sql_error)?;
        Ok(())
    }

    async fn upsert_employee(&mut self, app_id: i64, employee: &Employee) -> Result<()> {
        self.conn
            .execute(
                UPSERT_EMPLOYEE_SQL,
                params![
                    app_id,
                    employee.ding_userid,
                    employee.department_id,
                    employee.name,
                    self.acting_user,
                    Utc::now().timestamp()
                ],
            )
            .map_err(map_sql_error)?;
        Ok(())
    }

    async fn append_audit_log(&mut self, entry: &AuditLogEntry) -> Result<()> {
        self.conn
            .execute(
                INSERT_AUDIT_SQL,
                params![
                    entry.organization_id,
                    entry.app_id,
                    entry.detail,
                    self.acting_user,
                    Utc::now().timestamp()
                ],
            )
            .map_err(map_sql_error)?;
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        self.conn.execute_batch("COMMIT").map_err(map_sql_error)?;
        self.committed = true;
        debug!(acting_user = %self.acting_user, "sync session committed");
        Ok(())
    }
}

impl Drop for SqliteSyncSession {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            warn!(error = %err, "failed to roll back abandoned sync session");
        }
    }
}

/// Opens each session on its own pooled connection
#[derive(Clone)]
pub struct SqliteSessionProvider {
    db: Arc<DbManager>,
}

impl SqliteSessionProvider {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl SessionProvider for SqliteSessionProvider {
    fn open_session(&self, acting_user: &str) -> Result<Box<dyn SyncSession>> {
        let conn = self.db.get_connection()?;
        Ok(Box::new(SqliteSyncSession::begin(conn, acting_user)?))
    }
}
