//! Port interfaces for the DingTalk request client

use std::sync::Arc;

use async_trait::async_trait;
use dingbridge_domain::{
    AppCredential, AuthScope, Department, MediaUpload, OutgoingMessage, Result, TemplateSpec,
    UserPage,
};

/// Authenticated, short-lived session against the DingTalk open platform.
///
/// Every call is a single attempt; callers decide whether to retry.
#[async_trait]
pub trait DingTalkApi: Send + Sync {
    /// Fetch the scopes the app is authorized for.
    ///
    /// Fails with `Auth` when the credential is rejected.
    async fn get_auth_scopes(&self) -> Result<AuthScope>;

    /// Upload a media file and return its `media_id`.
    async fn upload_media(&self, upload: MediaUpload) -> Result<String>;

    /// Send a work notification and return the platform task id.
    async fn send_message(&self, message: &OutgoingMessage) -> Result<String>;

    /// Create or update the official OA template keyed by `process_code`.
    /// Returns the template's process code.
    async fn create_or_update_template(&self, template: &TemplateSpec) -> Result<String>;

    /// A single department by id.
    async fn get_department(&self, department_id: i64) -> Result<Department>;

    /// Direct children of a department.
    async fn list_sub_departments(&self, parent_id: i64) -> Result<Vec<Department>>;

    /// One page of a department's members.
    async fn list_department_users(
        &self,
        department_id: i64,
        cursor: i64,
        size: u32,
    ) -> Result<UserPage>;
}

/// Builds a fresh [`DingTalkApi`] per credential. Clients are value objects
/// and are never shared across runs.
pub trait RequestClientFactory: Send + Sync {
    fn create(&self, credential: &AppCredential) -> Result<Arc<dyn DingTalkApi>>;
}
