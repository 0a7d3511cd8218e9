//! Read side of the sync audit log.
//!
//! Entries are only ever written through a sync session; this repository
//! serves them back for operators.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use dingbridge_core::AuditLogRepository;
use dingbridge_domain::{AuditLogEntry, AuditLogRecord, DingBridgeError, Result};
use rusqlite::{params, Connection, Row};
use tokio::task;

use super::app_repository::map_join_error;
use super::manager::{map_sql_error, DbManager};

pub struct SqliteAuditLogRepository {
    db: Arc<DbManager>,
}

impl SqliteAuditLogRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn fetch(conn: &Connection, app_id: i64, limit: i64) -> Result<Vec<AuditLogRecord>> {
        let mut stmt = conn
            .prepare(
                "SELECT id, company_id, ding_app_id, detail, created_by, created_at
                 FROM ding_logs
                 WHERE ding_app_id = ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(map_sql_error)?;
        let rows = stmt.query_map(params![app_id, limit], map_record_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

#[async_trait]
impl AuditLogRepository for SqliteAuditLogRepository {
    async fn list_for_app(&self, app_id: i64, limit: usize) -> Result<Vec<AuditLogRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit)
            .map_err(|_| DingBridgeError::Validation(format!("limit {limit} is too large")))?;

        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            Self::fetch(&conn, app_id, limit)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<AuditLogRecord> {
    let created_at: i64 = row.get(5)?;
    Ok(AuditLogRecord {
        id: row.get(0)?,
        entry: AuditLogEntry {
            organization_id: row.get(1)?,
            app_id: row.get(2)?,
            detail: row.get(3)?,
        },
        created_by: row.get(4)?,
        created_at: DateTime::from_timestamp(created_at, 0).unwrap_or_default(),
    })
}
