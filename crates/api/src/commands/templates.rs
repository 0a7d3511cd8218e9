//! Official OA approval templates

use dingbridge_domain::{Result, TemplateSpec};

use super::execute_blocking;
use crate::context::AppContext;

/// Create the template, or update it in place when `process_code` already
/// exists on the platform. Returns the process code.
pub fn create_or_update_official_oa_template(
    ctx: &AppContext,
    app_id: i64,
    template: TemplateSpec,
) -> Result<String> {
    execute_blocking(ctx, "templates::create_or_update_official_oa_template", async move {
        template.validate()?;

        let app = ctx.apps.get(app_id).await?;
        ctx.dingtalk.create_or_update_template(&app, template).await
    })
}
