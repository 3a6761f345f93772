//! Hold-time stopwatch.
//!
//! Accumulates elapsed wall-clock time across start/pause/resume cycles.
//! Like the countdown it has no internal thread: every command takes the
//! current epoch-ms reading from the caller.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Stopped
//! any  -> reset  -> Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::format_hms;
use crate::error::TimerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwatchState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl StopwatchState {
    fn name(self) -> &'static str {
        match self {
            StopwatchState::Idle => "idle",
            StopwatchState::Running => "running",
            StopwatchState::Paused => "paused",
            StopwatchState::Stopped => "stopped",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stopwatch {
    state: StopwatchState,
    elapsed_ms: u64,
    /// Epoch milliseconds of the last start/resume or flush while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<i64>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            state: StopwatchState::Idle,
            elapsed_ms: 0,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> StopwatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == StopwatchState::Running
    }

    pub fn elapsed_ms_at(&self, now_ms: i64) -> u64 {
        match self.last_tick_epoch_ms {
            Some(last) if self.is_running() => self.elapsed_ms + since(last, now_ms),
            _ => self.elapsed_ms,
        }
    }

    /// Whole seconds elapsed.
    pub fn elapsed_secs_at(&self, now_ms: i64) -> u64 {
        self.elapsed_ms_at(now_ms) / 1000
    }

    pub fn format_hms_at(&self, now_ms: i64) -> String {
        format_hms(self.elapsed_secs_at(now_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start timing. Time accumulated before a stop is kept.
    pub fn start_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(self.invalid("start"));
        }
        self.state = StopwatchState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        Ok(())
    }

    pub fn stop_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if !self.is_running() {
            return Err(self.invalid("stop"));
        }
        self.flush_elapsed(now_ms);
        self.state = StopwatchState::Stopped;
        self.last_tick_epoch_ms = None;
        Ok(())
    }

    pub fn pause_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if !self.is_running() {
            return Err(self.invalid("pause"));
        }
        self.flush_elapsed(now_ms);
        self.state = StopwatchState::Paused;
        self.last_tick_epoch_ms = None;
        Ok(())
    }

    pub fn resume_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if self.state != StopwatchState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = StopwatchState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        Ok(())
    }

    /// Back to `00:00:00`, stopped. Always valid.
    pub fn reset(&mut self) {
        self.state = StopwatchState::Idle;
        self.elapsed_ms = 0;
        self.last_tick_epoch_ms = None;
    }

    /// Reset and immediately start again.
    pub fn restart_at(&mut self, now_ms: i64) {
        self.reset();
        self.state = StopwatchState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: i64) {
        if let Some(last) = self.last_tick_epoch_ms {
            self.elapsed_ms += since(last, now_ms);
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }

    fn invalid(&self, operation: &'static str) -> TimerError {
        TimerError::InvalidState {
            timer: "stopwatch",
            operation,
            state: self.state.name(),
        }
    }
}

/// Milliseconds from `last` to `now`, zero if the clock went backwards.
pub(crate) fn since(last: i64, now: i64) -> u64 {
    now.saturating_sub(last).max(0) as u64
}
