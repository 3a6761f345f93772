use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "omo-cli", version, about = "Omo Tracker CLI")]
struct Cli {
    /// Data directory (defaults to ~/.config/omo-tracker)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a tracking session, reading actions from stdin
    Track(commands::track::TrackArgs),
    /// Learned bladder capacity
    Capacity {
        #[command(subcommand)]
        action: commands::capacity::CapacityAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = commands::resolve_data_dir(cli.data_dir).and_then(|dir| match cli.command {
        Commands::Track(args) => commands::track::run(args, &dir),
        Commands::Capacity { action } => commands::capacity::run(action, &dir),
        Commands::Config { action } => commands::config::run(action, &dir),
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
