//! Domain types and models

pub mod app;
pub mod audit;
pub mod hierarchy;
pub mod media;
pub mod message;
pub mod notification;
pub mod template;

pub use app::{AppCredential, DingApp, NewDingApp};
pub use audit::{AuditLogEntry, AuditLogRecord};
pub use hierarchy::{AuthScope, Department, Employee, UserPage};
pub use media::{MediaType, MediaUpload};
pub use message::{MessageTarget, OutgoingMessage, Recipients};
pub use notification::NotificationMessage;
pub use template::TemplateSpec;
