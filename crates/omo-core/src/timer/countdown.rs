//! Countdown for a hold goal.
//!
//! Remaining time floors at zero; reaching zero stops the countdown and
//! `tick_at` reports it once.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::stopwatch::since;
use crate::clock::format_hms;
use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl CountdownState {
    fn name(self) -> &'static str {
        match self {
            CountdownState::Idle => "idle",
            CountdownState::Running => "running",
            CountdownState::Paused => "paused",
            CountdownState::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Countdown {
    duration_ms: u64,
    remaining_ms: u64,
    state: CountdownState,
    #[serde(default)]
    last_tick_epoch_ms: Option<i64>,
}

impl Countdown {
    pub fn new(duration_secs: u64) -> Result<Self, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        let duration_ms = duration_secs
            .checked_mul(1000)
            .ok_or(TimerError::InvalidDuration)?;
        Ok(Self {
            duration_ms,
            remaining_ms: duration_ms,
            state: CountdownState::Idle,
            last_tick_epoch_ms: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_ms / 1000
    }

    pub fn remaining_ms_at(&self, now_ms: i64) -> u64 {
        match self.last_tick_epoch_ms {
            Some(last) if self.is_running() => {
                self.remaining_ms.saturating_sub(since(last, now_ms))
            }
            _ => self.remaining_ms,
        }
    }

    /// Remaining time rounded up to whole seconds, so `0` means done.
    pub fn remaining_secs_at(&self, now_ms: i64) -> u64 {
        self.remaining_ms_at(now_ms).div_ceil(1000)
    }

    pub fn format_hms_at(&self, now_ms: i64) -> String {
        format_hms(self.remaining_secs_at(now_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        match self.state {
            CountdownState::Idle | CountdownState::Paused => {
                self.state = CountdownState::Running;
                self.last_tick_epoch_ms = Some(now_ms);
                Ok(())
            }
            CountdownState::Running | CountdownState::Finished => Err(self.invalid("start")),
        }
    }

    pub fn pause_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if !self.is_running() {
            return Err(self.invalid("pause"));
        }
        self.flush_elapsed(now_ms);
        self.last_tick_epoch_ms = None;
        self.state = if self.remaining_ms == 0 {
            CountdownState::Finished
        } else {
            CountdownState::Paused
        };
        Ok(())
    }

    pub fn resume_at(&mut self, now_ms: i64) -> Result<(), TimerError> {
        if self.state != CountdownState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = CountdownState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        Ok(())
    }

    /// Back to the initial duration, idle.
    pub fn reset(&mut self) {
        self.remaining_ms = self.duration_ms;
        self.state = CountdownState::Idle;
        self.last_tick_epoch_ms = None;
    }

    /// Reset and immediately start again.
    pub fn restart_at(&mut self, now_ms: i64) {
        self.reset();
        self.state = CountdownState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
    }

    /// Call periodically. Returns `Some(Event::CountdownFinished)` when the
    /// countdown reaches zero.
    pub fn tick_at(&mut self, now_ms: i64) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.flush_elapsed(now_ms);
        if self.remaining_ms == 0 {
            self.state = CountdownState::Finished;
            self.last_tick_epoch_ms = None;
            return Some(Event::CountdownFinished {
                duration_secs: self.duration_secs(),
                at: Utc::now(),
            });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_ms: i64) {
        if let Some(last) = self.last_tick_epoch_ms {
            self.remaining_ms = self.remaining_ms.saturating_sub(since(last, now_ms));
            self.last_tick_epoch_ms = Some(now_ms);
        }
    }

    fn invalid(&self, operation: &'static str) -> TimerError {
        TimerError::InvalidState {
            timer: "countdown",
            operation,
            state: self.state.name(),
        }
    }
}
