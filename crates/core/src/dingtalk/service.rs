//! Direct DingTalk operations for application code
//!
//! Each call validates its arguments first, then builds a fresh client for
//! the app's credential and performs a single request. Errors propagate to
//! the caller untouched.

use std::sync::Arc;

use dingbridge_domain::{
    DingApp, MediaType, MediaUpload, MessageTarget, OutgoingMessage, Recipients, Result,
    TemplateSpec,
};
use tracing::{debug, info, instrument};

use super::ports::RequestClientFactory;

/// Messaging, media and template operations on behalf of one app
#[derive(Clone)]
pub struct DingTalkService {
    clients: Arc<dyn RequestClientFactory>,
}

impl DingTalkService {
    pub fn new(clients: Arc<dyn RequestClientFactory>) -> Self {
        Self { clients }
    }

    /// Upload media and return its `media_id`.
    ///
    /// `media_type` must be one of `image`, `voice`, `video` or `file`.
    #[instrument(skip(self, app, content), fields(app_id = app.id, size = content.len()))]
    pub async fn upload_media(
        &self,
        app: &DingApp,
        media_type: &str,
        content: Vec<u8>,
        filename: &str,
    ) -> Result<String> {
        let media_type: MediaType = media_type.parse()?;
        let upload = MediaUpload { media_type, filename: filename.to_string(), content };

        let client = self.clients.create(&app.credential)?;
        let media_id = client.upload_media(upload).await?;

        info!(app_id = app.id, %media_type, "media uploaded");
        Ok(media_id)
    }

    /// Send a work notification and return the platform task id.
    ///
    /// Fails with `Validation` when neither users nor departments are
    /// addressed, before any client is built.
    #[instrument(skip(self, app, recipients, departments, msg), fields(app_id = app.id))]
    pub async fn send_message(
        &self,
        app: &DingApp,
        recipients: Recipients,
        departments: Vec<String>,
        msg: serde_json::Value,
    ) -> Result<String> {
        let target = MessageTarget::new(recipients, departments)?;
        let message = OutgoingMessage::new(target, msg)?;

        let client = self.clients.create(&app.credential)?;
        let task_id = client.send_message(&message).await?;

        debug!(app_id = app.id, all_users = message.target.is_all_users(), "message accepted");
        Ok(task_id)
    }

    /// Create or update the official OA template keyed by its process code.
    #[instrument(skip(self, app, template), fields(app_id = app.id, process_code = %template.process_code))]
    pub async fn create_or_update_template(
        &self,
        app: &DingApp,
        template: TemplateSpec,
    ) -> Result<String> {
        template.validate()?;

        let client = self.clients.create(&app.credential)?;
        client.create_or_update_template(&template).await
    }
}
