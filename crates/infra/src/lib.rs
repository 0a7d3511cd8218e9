//! # DingBridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite storage: connection pool, isolated sync sessions, app and audit
//!   repositories
//! - The reqwest-based DingTalk client and its factory
//! - The broadcast notification bus
//! - The department hierarchy sync adapter
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `dingbridge-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod dingtalk;
pub mod errors;
pub mod http;
pub mod notifications;
pub mod sync;

// Re-export commonly used items
pub use database::*;
pub use dingtalk::{DingTalkClient, DingTalkClientConfig, DingTalkClientFactory, DingTalkError};
pub use http::*;
pub use notifications::*;
pub use sync::DepartmentHierarchySync;
