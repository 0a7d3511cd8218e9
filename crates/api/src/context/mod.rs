//! Application context - dependency injection container

use std::fs;
use std::path::Path;
use std::sync::Arc;

use dingbridge_core::{
    AppRepository, AuditLogRepository, DingTalkService, SyncOrchestrator, ThreadBridge,
};
use dingbridge_domain::{Config, DingBridgeError, Result};
use dingbridge_infra::{
    DbManager, DepartmentHierarchySync, DingTalkClientFactory, NotificationBus,
    SqliteAppRepository, SqliteAuditLogRepository, SqliteSessionProvider,
};
use tracing::info;

/// Type alias for app repository port trait object
type DynAppRepository = dyn AppRepository + Send + Sync + 'static;

/// Type alias for audit log repository port trait object
type DynAuditLogRepository = dyn AuditLogRepository + Send + Sync + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub apps: Arc<DynAppRepository>,
    pub audit_logs: Arc<DynAuditLogRepository>,
    pub notifications: NotificationBus,
    pub dingtalk: DingTalkService,
    pub sync: SyncOrchestrator,
    pub bridge: ThreadBridge,
}

impl AppContext {
    /// Build the context from the environment or a probed config file.
    pub fn new() -> Result<Self> {
        let config = dingbridge_infra::config::load()?;
        Self::new_with_config(config)
    }

    /// Build the context from an explicit configuration.
    ///
    /// Opens the connection pool and applies the schema before any service
    /// is constructed.
    pub fn new_with_config(config: Config) -> Result<Self> {
        ensure_parent_dir(Path::new(&config.database.path))?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let apps: Arc<DynAppRepository> = Arc::new(SqliteAppRepository::new(Arc::clone(&db)));
        let audit_logs: Arc<DynAuditLogRepository> =
            Arc::new(SqliteAuditLogRepository::new(Arc::clone(&db)));

        let notifications = NotificationBus::new();
        let clients = Arc::new(DingTalkClientFactory::new(&config.dingtalk));
        let dingtalk = DingTalkService::new(clients.clone());
        let sync = SyncOrchestrator::new(
            Arc::new(SqliteSessionProvider::new(Arc::clone(&db))),
            clients,
            Arc::new(DepartmentHierarchySync::new()),
            Arc::new(notifications.clone()),
        );

        info!(path = %db.path().display(), "application context ready");

        Ok(Self {
            config,
            db,
            apps,
            audit_logs,
            notifications,
            dingtalk,
            sync,
            bridge: ThreadBridge::new(),
        })
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| {
                DingBridgeError::Config(format!(
                    "failed to create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}
