//! # DingBridge Domain
//!
//! Business domain types for DingBridge.
//!
//! This crate contains:
//! - DingTalk application records and credentials
//! - Messaging, media and workflow-template value types
//! - Audit, notification and hierarchy types
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other DingBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
