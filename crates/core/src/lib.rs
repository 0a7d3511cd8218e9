//! # DingBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for the DingTalk request client,
//!   isolated sync sessions, hierarchy sync, notifications and app records
//! - The background sync orchestrator and its thread bridge
//! - The direct-call DingTalk service (messages, media, templates)
//!
//! ## Architecture Principles
//! - Only depends on `dingbridge-domain`
//! - No database or HTTP code
//! - All external dependencies via traits

pub mod apps;
pub mod dingtalk;
pub mod sync;

pub use apps::ports::{AppRepository, AuditLogRepository};
pub use dingtalk::ports::{DingTalkApi, RequestClientFactory};
pub use dingtalk::DingTalkService;
pub use sync::bridge::{DetachedHandle, ThreadBridge};
pub use sync::orchestrator::SyncOrchestrator;
pub use sync::ports::{
    HierarchySummary, HierarchySync, NotificationChannel, SessionProvider, SyncSession,
};
pub use sync::run::{SyncPhase, SyncRun};
