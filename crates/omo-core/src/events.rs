use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{EtaStatus, PermissionGate};

/// Every action in a tracking session produces an Event.
/// Front ends print or render them; `Snapshot` is the polled view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DrinkLogged {
        amount_ml: f64,
        at: DateTime<Utc>,
    },
    PermissionRolled {
        granted: bool,
        desperation: f64,
        at: DateTime<Utc>,
    },
    /// A permitted voiding or an accident.
    Voided {
        amount_ml: f64,
        by_permission: bool,
        /// Hold time that ended with this voiding.
        hold_secs: u64,
        at: DateTime<Utc>,
    },
    CountdownFinished {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Prior-session accidents forgotten; capacity recomputed without them.
    CapacityReset {
        capacity_ml: f64,
        at: DateTime<Utc>,
    },
    /// Accident amounts handed to the accident log at session end.
    SessionSaved {
        accidents: usize,
        at: DateTime<Utc>,
    },
    Snapshot {
        bladder_ml: f64,
        capacity_ml: f64,
        desperation: f64,
        eta: EtaStatus,
        hold_time: String,
        hold_goal_remaining: Option<String>,
        permission: PermissionGate,
        at: DateTime<Utc>,
    },
}
