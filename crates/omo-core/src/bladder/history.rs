//! Event records that make up a drinker's history.
//!
//! Intake and voiding events share one time-ordered sequence and are told
//! apart by their variant, never by separate storage.

use serde::{Deserialize, Serialize};

/// Fluid consumed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    /// Minutes since an arbitrary epoch.
    pub time: f64,
    /// Millilitres consumed.
    pub amount: f64,
}

impl Intake {
    pub fn new(time: f64, amount: f64) -> Self {
        Self { time, amount }
    }

    /// Portion of this intake not yet absorbed at time `t`.
    ///
    /// Decays with the given half-life once `t` is past the intake time.
    /// Before (or at) the intake time the full amount is unabsorbed.
    pub fn unabsorbed(&self, t: f64, half_life: f64) -> f64 {
        if t > self.time {
            2f64.powf((self.time - t) / half_life) * self.amount
        } else {
            self.amount
        }
    }
}

/// A release of fluid, either permitted or an accident.
///
/// `amount` is the modeled bladder content at `time`, fixed when the event
/// is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voiding {
    pub time: f64,
    pub amount: f64,
    pub by_permission: bool,
}

impl Voiding {
    pub fn is_accident(&self) -> bool {
        !self.by_permission
    }
}

/// One entry of the event history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEvent {
    Intake(Intake),
    Voiding(Voiding),
}

impl HistoryEvent {
    pub fn time(&self) -> f64 {
        match self {
            HistoryEvent::Intake(intake) => intake.time,
            HistoryEvent::Voiding(voiding) => voiding.time,
        }
    }

    pub fn as_intake(&self) -> Option<&Intake> {
        match self {
            HistoryEvent::Intake(intake) => Some(intake),
            HistoryEvent::Voiding(_) => None,
        }
    }

    pub fn as_voiding(&self) -> Option<&Voiding> {
        match self {
            HistoryEvent::Voiding(voiding) => Some(voiding),
            HistoryEvent::Intake(_) => None,
        }
    }
}

impl From<Intake> for HistoryEvent {
    fn from(intake: Intake) -> Self {
        HistoryEvent::Intake(intake)
    }
}

impl From<Voiding> for HistoryEvent {
    fn from(voiding: Voiding) -> Self {
        HistoryEvent::Voiding(voiding)
    }
}

/// Stable sort by event time. Equal times keep insertion order.
pub(crate) fn sort_by_time(events: &mut [HistoryEvent]) {
    events.sort_by(|a, b| a.time().total_cmp(&b.time()));
}
