//! DingTalk application records

use dingbridge_domain::{DingApp, NewDingApp, Result};

use super::execute_blocking;
use crate::context::AppContext;

/// Register a DingTalk application. Credentials are validated before the
/// record is written.
pub fn add_app(ctx: &AppContext, app: NewDingApp) -> Result<DingApp> {
    execute_blocking(ctx, "apps::add_app", async move {
        app.validate()?;
        ctx.apps.create(app).await
    })
}

/// Fetch one application by id.
pub fn get_app(ctx: &AppContext, app_id: i64) -> Result<DingApp> {
    execute_blocking(ctx, "apps::get_app", ctx.apps.get(app_id))
}

pub fn list_apps(ctx: &AppContext) -> Result<Vec<DingApp>> {
    execute_blocking(ctx, "apps::list_apps", ctx.apps.list())
}
