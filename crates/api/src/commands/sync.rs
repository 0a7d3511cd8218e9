//! Background organization sync

use std::time::Instant;

use dingbridge_core::DetachedHandle;
use dingbridge_domain::Result;

use super::execute_blocking;
use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Start a background sync of app `app_id` on behalf of `acting_user`.
///
/// Returns once the start notification has been sent and the run is
/// detached. The outcome is reported through the audit log and the end
/// notification; join the handle only if the caller wants to wait.
pub fn trigger_sync(ctx: &AppContext, app_id: i64, acting_user: &str) -> Result<DetachedHandle> {
    let app = execute_blocking(ctx, "sync::load_app", ctx.apps.get(app_id))?;

    let start = Instant::now();
    let result = ctx.sync.trigger(app, acting_user);
    log_command_execution("sync::trigger_sync", start.elapsed(), result.as_ref().err());
    result
}
