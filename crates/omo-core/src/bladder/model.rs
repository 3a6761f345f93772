//! Exponential-decay bladder model.
//!
//! Drinks are absorbed with a fixed half-life, which approximates a steady
//! urine production rate proportional to the excess water in the body. The
//! model keeps no timers: every query takes the current time in minutes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut model = BladderModel::new();
//! model.add_intake(0.0, 500.0);
//! let fullness = model.fullness_fraction(30.0);
//! let eta = model.estimated_time_to_emergency(30.0);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::history::{sort_by_time, HistoryEvent, Intake, Voiding};

/// Half-life of unabsorbed intake, in minutes.
pub const DEFAULT_HALF_LIFE_MIN: f64 = 45.0;
/// Capacity used when there is no accident data, in mL.
pub const DEFAULT_CAPACITY_ML: f64 = 500.0;
/// After a permission decision, another ask needs `capacity / quantum` of
/// newly absorbed fluid.
pub const DEFAULT_FULLNESS_QUANTUM: f64 = 5.0;

/// Tunable constants of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub half_life_min: f64,
    pub default_capacity_ml: f64,
    pub fullness_quantum: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            half_life_min: DEFAULT_HALF_LIFE_MIN,
            default_capacity_ml: DEFAULT_CAPACITY_ML,
            fullness_quantum: DEFAULT_FULLNESS_QUANTUM,
        }
    }
}

/// The most recent permission decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// `None` until the first decision is made.
    pub time: Option<f64>,
    pub granted: bool,
}

/// Bladder state derived from intake and voiding history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BladderModel {
    params: ModelParams,
    history: Vec<HistoryEvent>,
    prior_accidents: Vec<f64>,
    permission: PermissionRecord,
}

impl BladderModel {
    pub fn new() -> Self {
        Self::with_params(ModelParams::default())
    }

    pub fn with_params(params: ModelParams) -> Self {
        Self {
            params,
            history: Vec::new(),
            prior_accidents: Vec::new(),
            permission: PermissionRecord::default(),
        }
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Events ordered by non-decreasing time.
    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    /// Replace the whole history. Events may arrive in any order.
    pub fn set_history(&mut self, events: Vec<HistoryEvent>) {
        self.history = events;
        sort_by_time(&mut self.history);
    }

    pub fn drinks(&self) -> impl Iterator<Item = &Intake> + '_ {
        self.history.iter().filter_map(HistoryEvent::as_intake)
    }

    pub fn releases(&self) -> impl Iterator<Item = &Voiding> + '_ {
        self.history.iter().filter_map(HistoryEvent::as_voiding)
    }

    pub fn accidents(&self) -> impl Iterator<Item = &Voiding> + '_ {
        self.releases().filter(|v| v.is_accident())
    }

    /// Amounts of this session's accidents, for the accident log.
    pub fn accident_amounts(&self) -> Vec<f64> {
        self.accidents().map(|v| v.amount).collect()
    }

    pub fn prior_accidents(&self) -> &[f64] {
        &self.prior_accidents
    }

    pub fn set_prior_accidents(&mut self, amounts: Vec<f64>) {
        self.prior_accidents = amounts;
    }

    pub fn clear_prior_accidents(&mut self) {
        self.prior_accidents.clear();
    }

    pub fn last_permission(&self) -> PermissionRecord {
        self.permission
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn add_intake(&mut self, t: f64, amount: f64) {
        tracing::debug!(t, amount, "intake logged");
        self.push(Intake::new(t, amount).into());
    }

    /// Record a release of everything modeled in the bladder at `t`.
    ///
    /// Returns the recorded event. Accidents feed the capacity estimate from
    /// now on.
    pub fn add_voiding(&mut self, t: f64, by_permission: bool) -> Voiding {
        let voiding = Voiding {
            time: t,
            amount: self.bladder_content(t),
            by_permission,
        };
        tracing::debug!(t, amount = voiding.amount, by_permission, "voiding logged");
        self.push(voiding.into());
        voiding
    }

    /// Decide whether a request to void is granted.
    ///
    /// Draws `r` uniformly from `[-0.1, 1.1)`, so one draw in ten is an
    /// automatic no and one in ten an automatic yes. The request is granted
    /// when `r` exceeds the current fullness fraction.
    pub fn roll_for_permission<R: Rng + ?Sized>(&mut self, t: f64, rng: &mut R) -> bool {
        let roll = rng.gen::<f64>() * 1.2 - 0.1;
        let granted = roll > self.fullness_fraction(t);
        tracing::debug!(t, roll, granted, "permission rolled");
        self.permission = PermissionRecord {
            time: Some(t),
            granted,
        };
        granted
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Total fluid absorbed from all intakes by time `t`.
    pub fn absorbed(&self, t: f64) -> f64 {
        let h = self.params.half_life_min;
        self.drinks()
            .map(|d| d.amount - d.unabsorbed(t, h))
            .sum()
    }

    /// Modeled bladder content at `t`, in mL.
    pub fn bladder_content(&self, t: f64) -> f64 {
        let released: f64 = self
            .releases()
            .filter(|v| v.time <= t)
            .map(|v| v.amount)
            .sum();
        self.absorbed(t) - released
    }

    /// Mean accident amount across this session and prior sessions.
    ///
    /// Falls back to the default capacity when there are no accidents or the
    /// mean is not a positive number.
    pub fn capacity(&self) -> f64 {
        let (sum, count) = self
            .accidents()
            .map(|v| v.amount)
            .chain(self.prior_accidents.iter().copied())
            .fold((0.0, 0usize), |(sum, count), amount| (sum + amount, count + 1));
        if count == 0 {
            return self.params.default_capacity_ml;
        }
        let mean = sum / count as f64;
        if mean.is_finite() && mean > 0.0 {
            mean
        } else {
            self.params.default_capacity_ml
        }
    }

    /// Desperation: content over capacity, never reported above `1.0`.
    ///
    /// Not clamped below zero.
    pub fn fullness_fraction(&self, t: f64) -> f64 {
        let fullness = self.bladder_content(t) / self.capacity();
        if fullness > 1.0 {
            1.0
        } else {
            fullness
        }
    }

    /// Time at which content reaches capacity if nothing else is logged.
    ///
    /// `None` when total intake minus total voided does not exceed capacity.
    /// The answer is recomputed from the full history on every call, so a new
    /// drink supersedes any earlier estimate. `_t` is accepted for symmetry
    /// with the other queries; the estimate depends only on history.
    pub fn estimated_time_to_emergency(&self, _t: f64) -> Option<f64> {
        let h = self.params.half_life_min;
        let total_intake: f64 = self.drinks().map(|d| d.amount).sum();
        let total_voided: f64 = self.releases().map(|v| v.amount).sum();
        let excess = total_intake - total_voided - self.capacity();
        if excess <= 0.0 {
            return None;
        }

        let start = self
            .drinks()
            .map(|d| d.time)
            .min_by(|a, b| a.total_cmp(b))?;
        // Inverse of the total unabsorbed sum anchored at the first drink.
        let weighted: f64 = self
            .drinks()
            .map(|d| d.amount * 2f64.powf((d.time - start) / h))
            .sum();
        Some(start + h * (weighted / excess).log2())
    }

    /// Whether a new permission request may be made at `t`.
    pub fn permission_allowed(&self, t: f64) -> bool {
        match self.permission.time {
            None => true,
            Some(asked_at) => {
                self.absorbed(t) - self.absorbed(asked_at)
                    > self.capacity() / self.params.fullness_quantum
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn push(&mut self, event: HistoryEvent) {
        self.history.push(event);
        sort_by_time(&mut self.history);
    }
}
