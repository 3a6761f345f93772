mod history;
mod model;

pub use history::{HistoryEvent, Intake, Voiding};
pub use model::{
    BladderModel, ModelParams, PermissionRecord, DEFAULT_CAPACITY_ML, DEFAULT_FULLNESS_QUANTUM,
    DEFAULT_HALF_LIFE_MIN,
};
