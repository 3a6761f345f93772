//! Interactive tracking session over stdin.
//!
//! One action per line; every resulting event is printed to stdout as a
//! single JSON line. Session accidents are appended to the accident log when
//! stdin closes, on `quit`, and before any I/O error is returned.

use std::error::Error;
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use omo_core::clock::now_ms;
use omo_core::{AccidentLog, Config, Event, TimerError, TrackingSession};

/// Longest `watch` run, in seconds.
const MAX_WATCH_SECS: u64 = 24 * 60 * 60;

const HELP: &str = "\
commands:
  drink [ML]    log a drink (default amount from config)
  ask           ask for permission to pee
  pee           pee with granted permission
  accident      log an accident
  status        print the current state
  watch SECS    print the state every poll interval for SECS seconds
  reset         forget accidents recorded by earlier sessions
  help          show this help
  quit          save accidents and exit";

#[derive(Args)]
pub struct TrackArgs {
    /// Hold goal in minutes, restarted after every release
    #[arg(long)]
    hold_goal: Option<u64>,
    /// Seed for permission rolls (overrides session.rng_seed)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, PartialEq)]
enum TrackCommand {
    Drink(Option<f64>),
    Ask,
    Pee,
    Accident,
    Status,
    Watch(u64),
    ResetCapacity,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
fn parse_command(line: &str) -> Result<Option<TrackCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument '{extra}'"));
    }

    let verb = verb.to_ascii_lowercase();
    let command = match (verb.as_str(), arg) {
        ("drink", None) => TrackCommand::Drink(None),
        ("drink", Some(ml)) => TrackCommand::Drink(Some(
            ml.parse::<f64>()
                .ok()
                .filter(|ml| ml.is_finite() && *ml > 0.0)
                .ok_or_else(|| format!("invalid amount '{ml}'"))?,
        )),
        ("watch", Some(secs)) => TrackCommand::Watch(
            secs.parse::<u64>()
                .ok()
                .filter(|secs| *secs <= MAX_WATCH_SECS)
                .ok_or_else(|| {
                    format!("invalid duration '{secs}' (at most {MAX_WATCH_SECS} seconds)")
                })?,
        ),
        ("watch", None) => return Err("watch needs a duration in seconds".to_string()),
        ("ask", None) => TrackCommand::Ask,
        ("pee", None) => TrackCommand::Pee,
        ("accident", None) => TrackCommand::Accident,
        ("status", None) => TrackCommand::Status,
        ("reset", None) => TrackCommand::ResetCapacity,
        ("help", None) => TrackCommand::Help,
        ("quit" | "exit", None) => TrackCommand::Quit,
        ("ask" | "pee" | "accident" | "status" | "reset" | "help" | "quit" | "exit", Some(arg)) => {
            return Err(format!("unexpected argument '{arg}'"));
        }
        _ => return Err(format!("unknown command '{verb}' (try 'help')")),
    };
    Ok(Some(command))
}

fn emit(event: &Event) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn run(args: TrackArgs, data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load_in(data_dir)?;
    if let Some(seed) = args.seed {
        config.session.rng_seed = Some(seed);
    }
    let log = AccidentLog::new(config.accident_log_path(data_dir));
    let poll_interval = Duration::from_millis(config.session.poll_interval_ms.max(1));

    let started = now_ms();
    let mut session = TrackingSession::from_config(&config, log.load()?, started);
    if let Some(goal_min) = args.hold_goal {
        let goal_secs = goal_min
            .checked_mul(60)
            .ok_or(TimerError::InvalidDuration)?;
        session = session.with_hold_goal(goal_secs, started)?;
    }

    let outcome = drive(&mut session, &log, poll_interval);

    let accidents = session.finish();
    log.append(&accidents)?;
    outcome?;
    emit(&Event::SessionSaved {
        accidents: accidents.len(),
        at: Utc::now(),
    })?;
    Ok(())
}

/// Apply stdin actions until EOF or `quit`.
fn drive(
    session: &mut TrackingSession,
    log: &AccidentLog,
    poll_interval: Duration,
) -> Result<(), Box<dyn Error>> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let now = now_ms();
        if let Some(event) = session.refresh(now) {
            emit(&event)?;
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("error: {message}");
                continue;
            }
        };
        tracing::debug!(?command, "track command");

        match command {
            TrackCommand::Drink(ml) => emit(&session.drink(now, ml))?,
            TrackCommand::Ask => match session.ask(now) {
                Ok(event) => emit(&event)?,
                Err(e) => eprintln!("error: {e}"),
            },
            TrackCommand::Pee => match session.void(now) {
                Ok(event) => emit(&event)?,
                Err(e) => eprintln!("error: {e}"),
            },
            TrackCommand::Accident => emit(&session.accident(now))?,
            TrackCommand::Status => emit(&session.snapshot(now))?,
            TrackCommand::Watch(secs) => {
                let until = now + (secs as i64) * 1000;
                loop {
                    std::thread::sleep(poll_interval);
                    let now = now_ms();
                    if let Some(event) = session.refresh(now) {
                        emit(&event)?;
                    }
                    emit(&session.snapshot(now))?;
                    if now >= until {
                        break;
                    }
                }
            }
            TrackCommand::ResetCapacity => {
                log.reset()?;
                emit(&session.reset_capacity())?;
            }
            TrackCommand::Help => eprintln!("{HELP}"),
            TrackCommand::Quit => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drink_with_and_without_amount() {
        assert_eq!(parse_command("drink"), Ok(Some(TrackCommand::Drink(None))));
        assert_eq!(
            parse_command("  DRINK 250 "),
            Ok(Some(TrackCommand::Drink(Some(250.0))))
        );
        assert!(parse_command("drink -5").is_err());
        assert!(parse_command("drink lots").is_err());
    }

    #[test]
    fn parses_simple_actions() {
        assert_eq!(parse_command("ask"), Ok(Some(TrackCommand::Ask)));
        assert_eq!(parse_command("pee"), Ok(Some(TrackCommand::Pee)));
        assert_eq!(parse_command("accident"), Ok(Some(TrackCommand::Accident)));
        assert_eq!(parse_command("exit"), Ok(Some(TrackCommand::Quit)));
        assert_eq!(parse_command("watch 3"), Ok(Some(TrackCommand::Watch(3))));
        assert_eq!(parse_command("reset"), Ok(Some(TrackCommand::ResetCapacity)));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn rejects_unknown_and_extra_arguments() {
        assert!(parse_command("dance").is_err());
        assert!(parse_command("ask now").is_err());
        assert!(parse_command("drink 100 200").is_err());
        assert!(parse_command("watch").is_err());
        assert!(parse_command("reset all").is_err());
    }

    #[test]
    fn bounds_watch_duration() {
        assert_eq!(
            parse_command("watch 86400"),
            Ok(Some(TrackCommand::Watch(MAX_WATCH_SECS)))
        );
        assert!(parse_command("watch 86401").is_err());
        assert!(parse_command("watch 99999999999999999999").is_err());
    }
}
