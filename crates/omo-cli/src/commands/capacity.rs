use std::path::Path;

use chrono::Utc;
use clap::Subcommand;
use omo_core::{AccidentLog, BladderModel, Config, Event};

#[derive(Subcommand)]
pub enum CapacityAction {
    /// Print recorded accidents and the capacity they imply, as JSON
    Show,
    /// Forget every recorded accident
    Reset,
}

pub fn run(action: CapacityAction, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_in(data_dir)?;
    let log = AccidentLog::new(config.accident_log_path(data_dir));

    let mut model = BladderModel::with_params(config.model.params());

    match action {
        CapacityAction::Show => {
            let prior = log.load()?;
            let recorded = prior.len();
            model.set_prior_accidents(prior);
            let report = serde_json::json!({
                "accident_log": log.path().display().to_string(),
                "recorded_accidents": recorded,
                "capacity_ml": model.capacity(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        CapacityAction::Reset => {
            log.reset()?;
            let event = Event::CapacityReset {
                capacity_ml: model.capacity(),
                at: Utc::now(),
            };
            println!("{}", serde_json::to_string(&event)?);
        }
    }
    Ok(())
}
