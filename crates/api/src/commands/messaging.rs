//! Work notifications

use dingbridge_domain::{MessageTarget, Recipients, Result};

use super::execute_blocking;
use crate::context::AppContext;

/// Send a work notification through app `app_id` and return the task id.
///
/// `user_ids` may be the single sentinel `"to_all_user"`, which addresses
/// everyone visible to the app and overrides `dept_ids`. Addressing nobody
/// fails with `Validation` before the app is loaded or a client is built.
pub fn send_ding_message(
    ctx: &AppContext,
    app_id: i64,
    user_ids: Vec<String>,
    dept_ids: Vec<String>,
    msg: serde_json::Value,
) -> Result<String> {
    execute_blocking(ctx, "messaging::send_ding_message", async move {
        let recipients = Recipients::from_user_ids(user_ids);
        MessageTarget::new(recipients.clone(), dept_ids.clone())?;

        let app = ctx.apps.get(app_id).await?;
        ctx.dingtalk.send_message(&app, recipients, dept_ids, msg).await
    })
}
