//! Media uploads

use dingbridge_domain::{MediaType, Result};

use super::execute_blocking;
use crate::context::AppContext;

/// Upload `content` as `media_type` and return the platform `media_id`.
pub fn upload_media(
    ctx: &AppContext,
    app_id: i64,
    media_type: &str,
    content: Vec<u8>,
    filename: &str,
) -> Result<String> {
    execute_blocking(ctx, "media::upload_media", async move {
        media_type.parse::<MediaType>()?;

        let app = ctx.apps.get(app_id).await?;
        ctx.dingtalk.upload_media(&app, media_type, content, filename).await
    })
}
