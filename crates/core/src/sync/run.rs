//! Transient state of one sync run
//!
//! A [`SyncRun`] owns the narrative that ends up verbatim in the audit log.
//! Phases only move forward: `Idle → Starting → Running → Finalizing → Done`.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use dingbridge_domain::constants::NARRATIVE_TIME_FORMAT;
use dingbridge_domain::{impl_domain_enum_conversions, DingBridgeError, Result};
use tracing::debug;
use uuid::Uuid;

/// Orchestrator state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncPhase {
    Idle,
    Starting,
    Running,
    Finalizing,
    Done,
}

impl_domain_enum_conversions!(SyncPhase {
    Idle => "idle",
    Starting => "starting",
    Running => "running",
    Finalizing => "finalizing",
    Done => "done",
});

/// Narrative, timing and outcome of a single run
#[derive(Debug)]
pub struct SyncRun {
    run_id: Uuid,
    phase: SyncPhase,
    started_at: DateTime<Local>,
    started: Instant,
    elapsed: Option<Duration>,
    narrative: String,
    success: bool,
}

impl SyncRun {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            phase: SyncPhase::Idle,
            started_at: Local::now(),
            started: Instant::now(),
            elapsed: None,
            narrative: String::new(),
            success: false,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Wall-clock time between construction and [`SyncRun::close_narrative`].
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Move to `next`. Phases are never revisited.
    pub fn transition(&mut self, next: SyncPhase) -> Result<()> {
        if next <= self.phase {
            return Err(DingBridgeError::Internal(format!(
                "sync run {} cannot move from {} to {}",
                self.run_id, self.phase, next
            )));
        }
        debug!(run_id = %self.run_id, from = %self.phase, to = %next, "sync phase transition");
        self.phase = next;
        Ok(())
    }

    /// Start the narrative with a timestamped marker.
    pub fn open_narrative(&mut self) {
        self.narrative =
            format!("start sync at {}......", self.started_at.format(NARRATIVE_TIME_FORMAT));
    }

    pub fn record_success(&mut self) {
        self.success = true;
        self.narrative.push_str("\nsync success!");
    }

    /// Record a failure together with its full diagnostic text.
    pub fn record_failure(&mut self, diagnostic: &str) {
        self.success = false;
        self.narrative.push_str("\nsync failed, error: \n");
        self.narrative.push_str(diagnostic);
    }

    /// Append the end marker with elapsed seconds.
    ///
    /// The end timestamp is derived from the monotonic clock so it never
    /// precedes the start marker.
    pub fn close_narrative(&mut self) {
        let elapsed = self.started.elapsed();
        let ended_at = chrono::Duration::from_std(elapsed)
            .ok()
            .and_then(|delta| self.started_at.checked_add_signed(delta))
            .unwrap_or(self.started_at);

        self.elapsed = Some(elapsed);
        self.narrative.push_str(&format!(
            "\nsync end at {}, cost {:.2}s",
            ended_at.format(NARRATIVE_TIME_FORMAT),
            elapsed.as_secs_f64()
        ));
    }
}

impl Default for SyncRun {
    fn default() -> Self {
        Self::new()
    }
}
