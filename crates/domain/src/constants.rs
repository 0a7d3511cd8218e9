//! Application constants
//!
//! Values shared by the orchestrator, the notification bus and the DingTalk
//! client.

// Notification delivery
pub const NOTIFICATION_EVENT: &str = "simple_notification";
pub const SYNC_START_TITLE: &str = "Sync Start......";
pub const SYNC_START_MESSAGE: &str = "Start sync organization now, please wait......";
pub const SYNC_END_TITLE: &str = "Sync End......";

// Narrative timestamps (local time, microsecond precision)
pub const NARRATIVE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// DingTalk endpoints
pub const DEFAULT_OAPI_BASE_URL: &str = "https://oapi.dingtalk.com";
pub const DEFAULT_API_BASE_URL: &str = "https://api.dingtalk.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// DingTalk department id that stands for the whole organization.
pub const ROOT_DEPARTMENT_ID: i64 = 1;

/// Page size used when listing department members.
pub const USER_PAGE_SIZE: u32 = 100;
