//! Background organization sync orchestrator
//!
//! One trigger produces one run:
//!
//! 1. emit the start notification on the caller's thread
//! 2. detach a unit with its own runtime and a brand-new session
//! 3. build a request client, fetch auth scopes, delegate to hierarchy sync
//! 4. on every outcome, append the end marker, write exactly one audit entry
//!    and emit the end notification
//!
//! Failures inside the run never reach the trigger caller; they are recorded
//! in the audit narrative and reflected in the end notification's severity.

use std::any::Any;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dingbridge_domain::constants::{
    NOTIFICATION_EVENT, SYNC_END_TITLE, SYNC_START_MESSAGE, SYNC_START_TITLE,
};
use dingbridge_domain::{AuditLogEntry, DingApp, DingBridgeError, NotificationMessage, Result};
use futures::FutureExt;
use tracing::{error, info, instrument, warn};

use super::bridge::{DetachedHandle, ThreadBridge};
use super::ports::{
    HierarchySummary, HierarchySync, NotificationChannel, SessionProvider, SyncSession,
};
use super::run::{SyncPhase, SyncRun};
use crate::dingtalk::ports::RequestClientFactory;

/// Coordinates end-to-end hierarchy sync runs
#[derive(Clone)]
pub struct SyncOrchestrator {
    sessions: Arc<dyn SessionProvider>,
    clients: Arc<dyn RequestClientFactory>,
    hierarchy: Arc<dyn HierarchySync>,
    notifier: Arc<dyn NotificationChannel>,
    bridge: ThreadBridge,
}

impl SyncOrchestrator {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        clients: Arc<dyn RequestClientFactory>,
        hierarchy: Arc<dyn HierarchySync>,
        notifier: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self { sessions, clients, hierarchy, notifier, bridge: ThreadBridge::new() }
    }

    /// Start a background sync of `app` on behalf of `acting_user`.
    ///
    /// Emits the start notification, detaches the run and returns
    /// immediately. The handle may be dropped; the run's outcome is reported
    /// only through the audit log and the end notification.
    ///
    /// # Errors
    ///
    /// Only fails if the detached thread cannot be spawned.
    #[instrument(skip(self, app, acting_user), fields(app_id = app.id, acting_user = %acting_user))]
    pub fn trigger(&self, app: DingApp, acting_user: &str) -> Result<DetachedHandle> {
        self.notifier.send(
            acting_user,
            NOTIFICATION_EVENT,
            NotificationMessage::info(SYNC_START_TITLE, SYNC_START_MESSAGE),
        );

        let orchestrator = self.clone();
        let user = acting_user.to_string();
        let thread_name = format!("ding-sync-{}", app.id);

        self.bridge
            .detach(thread_name, move || async move {
                orchestrator.run(&app, &user).await;
            })
            .inspect_err(|err| error!(error = %err, "failed to detach sync run"))
    }

    /// Execute one run to completion on the current task.
    ///
    /// [`SyncOrchestrator::trigger`] calls this on the detached unit; it is
    /// public so async callers can await a run directly. The start
    /// notification is not emitted here.
    pub async fn run(&self, app: &DingApp, acting_user: &str) -> SyncRun {
        let mut run = SyncRun::new();
        advance(&mut run, SyncPhase::Starting);
        info!(run_id = %run.run_id(), app_id = app.id, "organization sync started");

        let mut session = match self.sessions.open_session(acting_user) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(run_id = %run.run_id(), error = %err, "could not open isolated session");
                run.open_narrative();
                run.record_failure(&describe_error(&err));
                None
            }
        };

        advance(&mut run, SyncPhase::Running);
        if let Some(session) = session.as_deref_mut() {
            run.open_narrative();
            let outcome = AssertUnwindSafe(self.sync_body(session, app)).catch_unwind().await;
            match outcome {
                Ok(Ok(summary)) => {
                    info!(
                        run_id = %run.run_id(),
                        departments = summary.departments,
                        employees = summary.employees,
                        "hierarchy sync succeeded"
                    );
                    run.record_success();
                }
                Ok(Err(err)) => {
                    warn!(run_id = %run.run_id(), kind = err.kind(), error = %err, "sync failed");
                    run.record_failure(&describe_error(&err));
                }
                Err(payload) => {
                    error!(run_id = %run.run_id(), "sync panicked");
                    run.record_failure(&describe_panic(payload.as_ref()));
                }
            }
        }

        advance(&mut run, SyncPhase::Finalizing);
        run.close_narrative();
        let entry = AuditLogEntry {
            organization_id: app.company_id,
            app_id: app.id,
            detail: run.narrative().to_string(),
        };
        self.persist_audit(session, &entry, acting_user).await;

        let outcome = if run.is_success() { "success" } else { "failed" };
        let message = format!("Sync organization end, {outcome}");
        let notification = if run.is_success() {
            NotificationMessage::info(SYNC_END_TITLE, message)
        } else {
            NotificationMessage::warning(SYNC_END_TITLE, message)
        };
        self.notifier.send(acting_user, NOTIFICATION_EVENT, notification);

        advance(&mut run, SyncPhase::Done);
        info!(
            run_id = %run.run_id(),
            app_id = app.id,
            success = run.is_success(),
            elapsed_ms = run.elapsed().map(millis).unwrap_or_default(),
            "organization sync finished"
        );
        run
    }

    async fn sync_body(
        &self,
        session: &mut dyn SyncSession,
        app: &DingApp,
    ) -> Result<HierarchySummary> {
        let client = self.clients.create(&app.credential)?;
        let scopes = client.get_auth_scopes().await?;
        self.hierarchy.sync(session, app, client.as_ref(), &scopes).await
    }

    /// Write the audit entry through the run's session and commit. If that
    /// path is unavailable or fails, the entry is written alone through a
    /// fresh session; the failed session is dropped and rolls back first.
    async fn persist_audit(
        &self,
        session: Option<Box<dyn SyncSession>>,
        entry: &AuditLogEntry,
        acting_user: &str,
    ) {
        if let Some(session) = session {
            match write_and_commit(session, entry).await {
                Ok(()) => return,
                Err(err) => {
                    warn!(app_id = entry.app_id, error = %err, "audit write failed, retrying alone")
                }
            }
        }

        let fallback = match self.sessions.open_session(acting_user) {
            Ok(session) => write_and_commit(session, entry).await,
            Err(err) => Err(err),
        };
        if let Err(err) = fallback {
            error!(
                app_id = entry.app_id,
                error = %err,
                detail = %entry.detail,
                "audit entry could not be persisted"
            );
        }
    }
}

async fn write_and_commit(mut session: Box<dyn SyncSession>, entry: &AuditLogEntry) -> Result<()> {
    session.append_audit_log(entry).await?;
    session.commit()
}

fn advance(run: &mut SyncRun, next: SyncPhase) {
    if let Err(err) = run.transition(next) {
        error!(error = %err, "sync state machine violation");
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Error text plus its source chain.
fn describe_error(err: &DingBridgeError) -> String {
    let mut text = format!("{err} (kind: {})", err.kind());
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        text.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    text
}

fn describe_panic(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("unexpected fault: panicked: {message}")
}
