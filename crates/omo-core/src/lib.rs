//! # Omo Tracker Core Library
//!
//! This library models bladder fullness from logged drinks and voidings,
//! learns a personal capacity from accidents, predicts when the next potty
//! emergency is due, and decides whether a request to void is granted. The
//! CLI binary is a thin front end over the same library.
//!
//! ## Architecture
//!
//! - **Bladder Model**: a pure function of the event history and the
//!   caller-supplied time; it holds no timers
//! - **Timers**: wall-clock stopwatch and countdown for hold time, driven by
//!   the caller
//! - **Session**: the permission gate and hold timing around one model
//! - **Storage**: append-only accident log and TOML configuration
//!
//! ## Key Components
//!
//! - [`BladderModel`]: intake/voiding history and every derived query
//! - [`TrackingSession`]: the interaction rules of a tracking session
//! - [`AccidentLog`]: accident amounts carried between sessions
//! - [`Config`]: application configuration management

pub mod bladder;
pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod timer;

pub use bladder::{BladderModel, HistoryEvent, Intake, ModelParams, PermissionRecord, Voiding};
pub use error::{ConfigError, CoreError, SessionError, StorageError, TimerError};
pub use events::Event;
pub use session::{EtaStatus, PermissionGate, TrackingSession};
pub use storage::{AccidentLog, Config};
pub use timer::{Countdown, CountdownState, Stopwatch, StopwatchState};
