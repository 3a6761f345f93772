//! A tracking session: the bladder model plus the rules a front end applies
//! around it.
//!
//! The session owns the model, the random source for permission rolls, a
//! stopwatch measuring the current hold, and an optional hold-goal countdown.
//! All commands take the wall clock in epoch milliseconds; the model sees the
//! same reading converted to minutes.
//!
//! ## Permission gate
//!
//! ```text
//! Ready --ask--> Granted --void--> Cooldown
//!       \-ask--> Denied
//! (Granted | Denied | Cooldown) --enough absorbed--> Ready
//! ```

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bladder::BladderModel;
use crate::clock::ms_to_minutes;
use crate::error::{SessionError, TimerError};
use crate::events::Event;
use crate::storage::{Config, DrinkConfig};
use crate::timer::{Countdown, Stopwatch};

/// Whether the user may ask, or has been allowed, to void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionGate {
    /// A new request may be made.
    Ready,
    /// The last request was granted and not used yet.
    Granted,
    Denied,
    /// Voided with permission; waiting before the next request.
    Cooldown,
}

/// Time left until the modeled bladder reaches capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EtaStatus {
    /// No emergency predicted with the current history.
    None,
    InMinutes { minutes: u64 },
    Now,
}

impl EtaStatus {
    /// Whole minutes from `now` to `eta`, rounded up.
    pub fn from_eta(eta: Option<f64>, now_min: f64) -> Self {
        match eta {
            None => EtaStatus::None,
            Some(eta) => {
                let minutes = (eta - now_min).ceil();
                if minutes >= 1.0 {
                    EtaStatus::InMinutes {
                        minutes: minutes as u64,
                    }
                } else {
                    EtaStatus::Now
                }
            }
        }
    }
}

impl fmt::Display for EtaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtaStatus::None => Ok(()),
            EtaStatus::InMinutes { minutes: 1 } => write!(f, "Potty emergency in: 1 minute"),
            EtaStatus::InMinutes { minutes } => {
                write!(f, "Potty emergency in: {minutes} minutes")
            }
            EtaStatus::Now => write!(f, "Potty emergency now!"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackingSession<R = Pcg64> {
    model: BladderModel,
    drink: DrinkConfig,
    rng: R,
    hold: Stopwatch,
    hold_goal: Option<Countdown>,
    gate: PermissionGate,
}

impl TrackingSession<Pcg64> {
    /// Session configured from `config`, seeded with prior accident amounts.
    ///
    /// Permission rolls use `session.rng_seed` when set, entropy otherwise.
    pub fn from_config(config: &Config, prior_accidents: Vec<f64>, started_ms: i64) -> Self {
        let rng = match config.session.rng_seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        let mut model = BladderModel::with_params(config.model.params());
        model.set_prior_accidents(prior_accidents);
        Self::new(model, config.drink.clone(), rng, started_ms)
    }
}

impl<R: Rng> TrackingSession<R> {
    /// Start a session; the hold stopwatch starts at `started_ms`.
    pub fn new(model: BladderModel, drink: DrinkConfig, rng: R, started_ms: i64) -> Self {
        let mut hold = Stopwatch::new();
        hold.restart_at(started_ms);
        tracing::info!(
            prior_accidents = model.prior_accidents().len(),
            capacity = model.capacity(),
            "tracking session started"
        );
        Self {
            model,
            drink,
            rng,
            hold,
            hold_goal: None,
            gate: PermissionGate::Ready,
        }
    }

    /// Count down `goal_secs` for every hold, starting now.
    pub fn with_hold_goal(mut self, goal_secs: u64, now_ms: i64) -> Result<Self, TimerError> {
        let mut countdown = Countdown::new(goal_secs)?;
        countdown.start_at(now_ms)?;
        self.hold_goal = Some(countdown);
        Ok(self)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn model(&self) -> &BladderModel {
        &self.model
    }

    pub fn gate(&self) -> PermissionGate {
        self.gate
    }

    pub fn hold(&self) -> &Stopwatch {
        &self.hold
    }

    pub fn snapshot(&self, now_ms: i64) -> Event {
        let t = ms_to_minutes(now_ms);
        Event::Snapshot {
            bladder_ml: self.model.bladder_content(t),
            capacity_ml: self.model.capacity(),
            desperation: self.model.fullness_fraction(t),
            eta: EtaStatus::from_eta(self.model.estimated_time_to_emergency(t), t),
            hold_time: self.hold.format_hms_at(now_ms),
            hold_goal_remaining: self.hold_goal.as_ref().map(|cd| cd.format_hms_at(now_ms)),
            permission: self.gate,
            at: Utc::now(),
        }
    }

    /// Accident amounts of this session, to append to the accident log.
    pub fn finish(&self) -> Vec<f64> {
        let amounts = self.model.accident_amounts();
        tracing::info!(accidents = amounts.len(), "tracking session finished");
        amounts
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Re-open the gate once enough has been absorbed since the last
    /// decision, and advance the hold goal.
    ///
    /// Returns `Some(Event::CountdownFinished)` when the hold goal is reached.
    /// `ask` and `void` only touch the gate; the hold goal advances here.
    pub fn refresh(&mut self, now_ms: i64) -> Option<Event> {
        self.reopen_gate(now_ms);
        self.hold_goal.as_mut().and_then(|cd| cd.tick_at(now_ms))
    }

    /// Forget accidents carried over from earlier sessions. This session's
    /// own accidents still count.
    pub fn reset_capacity(&mut self) -> Event {
        self.model.clear_prior_accidents();
        let capacity_ml = self.model.capacity();
        tracing::info!(capacity_ml, "prior accidents cleared");
        Event::CapacityReset {
            capacity_ml,
            at: Utc::now(),
        }
    }

    /// Log a drink. `None` uses the configured default amount; any amount
    /// is snapped to the configured step and range.
    pub fn drink(&mut self, now_ms: i64, ml: Option<f64>) -> Event {
        let amount = self
            .drink
            .quantize(ml.unwrap_or_else(|| f64::from(self.drink.default_ml)));
        self.model.add_intake(ms_to_minutes(now_ms), amount);
        tracing::info!(amount, "drink logged");
        Event::DrinkLogged {
            amount_ml: amount,
            at: Utc::now(),
        }
    }

    pub fn ask(&mut self, now_ms: i64) -> Result<Event, SessionError> {
        self.reopen_gate(now_ms);
        if self.gate != PermissionGate::Ready {
            return Err(SessionError::AskTooSoon);
        }
        let t = ms_to_minutes(now_ms);
        let desperation = self.model.fullness_fraction(t);
        let granted = self.model.roll_for_permission(t, &mut self.rng);
        self.gate = if granted {
            PermissionGate::Granted
        } else {
            PermissionGate::Denied
        };
        tracing::info!(granted, desperation, "permission requested");
        Ok(Event::PermissionRolled {
            granted,
            desperation,
            at: Utc::now(),
        })
    }

    /// Void with permission. Requires a granted, still valid request.
    pub fn void(&mut self, now_ms: i64) -> Result<Event, SessionError> {
        self.reopen_gate(now_ms);
        if self.gate != PermissionGate::Granted {
            return Err(SessionError::NotPermitted);
        }
        let event = self.release(now_ms, true);
        self.gate = PermissionGate::Cooldown;
        Ok(event)
    }

    /// Log an accident. Always allowed.
    pub fn accident(&mut self, now_ms: i64) -> Event {
        self.release(now_ms, false)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reopen_gate(&mut self, now_ms: i64) {
        let t = ms_to_minutes(now_ms);
        if self.gate != PermissionGate::Ready && self.model.permission_allowed(t) {
            tracing::debug!(from = ?self.gate, "permission gate reopened");
            self.gate = PermissionGate::Ready;
        }
    }

    fn release(&mut self, now_ms: i64, by_permission: bool) -> Event {
        let hold_secs = self.hold.elapsed_secs_at(now_ms);
        let voiding = self.model.add_voiding(ms_to_minutes(now_ms), by_permission);
        self.hold.restart_at(now_ms);
        if let Some(cd) = self.hold_goal.as_mut() {
            cd.restart_at(now_ms);
        }
        tracing::info!(amount = voiding.amount, by_permission, hold_secs, "voided");
        Event::Voided {
            amount_ml: voiding.amount,
            by_permission,
            hold_secs,
            at: Utc::now(),
        }
    }
}
