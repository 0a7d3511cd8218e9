//! SQLite-backed DingTalk app records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dingbridge_core::AppRepository;
use dingbridge_domain::{AppCredential, DingApp, DingBridgeError, NewDingApp, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::info;

use super::manager::{map_sql_error, DbManager};

const APP_COLUMNS: &str = "id, name, description, app_key, app_secret, agent_id, company_id,
     sync_with_user, callback_token, encoding_aes_key";

/// App repository on the shared pool
pub struct SqliteAppRepository {
    db: Arc<DbManager>,
}

impl SqliteAppRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert(conn: &Connection, app: &NewDingApp) -> Result<i64> {
        conn.execute(
            "INSERT INTO ding_apps (name, description, app_key, app_secret, agent_id, company_id,
                 sync_with_user, callback_token, encoding_aes_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                app.name,
                app.description,
                app.credential.app_key,
                app.credential.app_secret,
                app.credential.agent_id,
                app.company_id,
                app.sync_with_user,
                app.callback_token,
                app.encoding_aes_key,
                Utc::now().timestamp()
            ],
        )
        .map_err(map_sql_error)?;
        Ok(conn.last_insert_rowid())
    }

    fn find(conn: &Connection, id: i64) -> Result<DingApp> {
        conn.query_row(
            &format!("SELECT {APP_COLUMNS} FROM ding_apps WHERE id = ?1"),
            params![id],
            map_app_row,
        )
        .optional()
        .map_err(map_sql_error)?
        .ok_or_else(|| DingBridgeError::NotFound(format!("DingTalk app {id}")))
    }

    fn all(conn: &Connection) -> Result<Vec<DingApp>> {
        let mut stmt = conn
            .prepare(&format!("SELECT {APP_COLUMNS} FROM ding_apps ORDER BY id"))
            .map_err(map_sql_error)?;
        let rows = stmt.query_map([], map_app_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }
}

#[async_trait]
impl AppRepository for SqliteAppRepository {
    async fn create(&self, app: NewDingApp) -> Result<DingApp> {
        app.validate()?;
        let db = Arc::clone(&self.db);

        let created = task::spawn_blocking(move || -> Result<DingApp> {
            let conn = db.get_connection()?;
            let id = Self::insert(&conn, &app)?;
            Self::find(&conn, id)
        })
        .await
        .map_err(map_join_error)??;

        info!(app_id = created.id, name = %created.name, "DingTalk app registered");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<DingApp> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            Self::find(&conn, id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list(&self) -> Result<Vec<DingApp>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || {
            let conn = db.get_connection()?;
            Self::all(&conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_app_row(row: &Row<'_>) -> rusqlite::Result<DingApp> {
    Ok(DingApp {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        credential: AppCredential::new(
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ),
        company_id: row.get(6)?,
        sync_with_user: row.get(7)?,
        callback_token: row.get(8)?,
        encoding_aes_key: row.get(9)?,
    })
}

pub(crate) fn map_join_error(err: task::JoinError) -> DingBridgeError {
    DingBridgeError::Internal(format!("database task failed: {err}"))
}
