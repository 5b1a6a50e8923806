use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::{ConfigLoader, CONFIG_ENV};

pub mod commands;

use self::commands::PrintArgs;

const BLOCKS_HELP: &str = "\
Time blocks:
  --blocks \"START-END TASK[;START-END TASK;...]\"
      Provide time blocks separated by semicolons (;) where each block has:
      - START and END in the format HH:MM
      - TASK is the description of the activity

Example:
  deepwork --blocks \"07:00-09:00 Deep Work;09:00-09:30 Emails\"

Without --blocks the day is seeded from `default_blocks` in the config file,
or from a built-in schedule.";

#[derive(Parser, Debug)]
#[command(
    name = "deepwork",
    version,
    about = "Plan and follow the day's time blocks from the terminal",
    after_help = BLOCKS_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Seed schedule, e.g. "07:00-09:00 Deep Work;09:00-09:30 Emails"
    #[arg(long, global = true)]
    pub blocks: Option<String>,

    /// Override the config file location (takes precedence over DEEPWORK_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Print the schedule column as plain text and exit
    Print(PrintArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let command = cli.command.unwrap_or(Commands::Tui);
    let log_file = matches!(command, Commands::Tui).then(|| loader.paths().log_file());
    init_tracing(&cli.log_level, log_file.as_deref())
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;
    let schedule = config.initial_schedule(cli.blocks.as_deref())?;
    tracing::debug!(blocks = schedule.len(), "schedule seeded");

    let config = Arc::new(config);
    match command {
        Commands::Tui => {
            let mut app = App::new(config, schedule);
            commands::run_tui(&mut app)
        }
        Commands::Print(args) => commands::print_schedule(&config, &schedule, &args),
    }
}

/// Logs go to `log_file` when given (the TUI owns the terminal), stderr otherwise.
fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            None => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
        Ok(())
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn blocks_flag_is_accepted_before_and_after_subcommand() {
        let before = Cli::try_parse_from(["deepwork", "--blocks", "07:00-08:00 Run", "print"])
            .expect("parses");
        assert_eq!(before.blocks.as_deref(), Some("07:00-08:00 Run"));
        assert!(matches!(before.command, Some(Commands::Print(_))));

        let after = Cli::try_parse_from(["deepwork", "print", "--blocks", "07:00-08:00 Run"])
            .expect("parses");
        assert_eq!(after.blocks.as_deref(), Some("07:00-08:00 Run"));
    }

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["deepwork"]).expect("parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "info");
    }
}
