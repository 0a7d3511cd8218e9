//! Database implementations

pub mod app_repository;
pub mod audit_repository;
pub mod manager;
pub mod session;

pub use app_repository::SqliteAppRepository;
pub use audit_repository::SqliteAuditLogRepository;
pub use manager::{DbManager, SqliteConnection};
pub use session::{SqliteSessionProvider, SqliteSyncSession};
