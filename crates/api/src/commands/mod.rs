//! Application commands
//!
//! Every command is a plain synchronous function. Async services are driven
//! through [`ThreadBridge::block_on`](dingbridge_core::ThreadBridge::block_on),
//! so callers never need a runtime of their own.

pub mod apps;
pub mod logs;
pub mod media;
pub mod messaging;
pub mod sync;
pub mod templates;

use std::future::Future;
use std::time::Instant;

use dingbridge_domain::Result;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

pub use apps::{add_app, get_app, list_apps};
pub use logs::list_logs;
pub use media::upload_media;
pub use messaging::send_ding_message;
pub use sync::trigger_sync;
pub use templates::create_or_update_official_oa_template;

/// Run `command` to completion on a fresh runtime, timing and logging it.
fn execute_blocking<Fut, T>(ctx: &AppContext, command_name: &str, command: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>> + Send,
    T: Send,
{
    let start = Instant::now();
    let result = ctx.bridge.block_on(command).and_then(|inner| inner);
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
