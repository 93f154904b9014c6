//! Host-side tooling for Rally deployments.
//!
//! Guarded by the `host` feature. Lets integrators inspect a persisted
//! navigation state file and validate a config file without booting a UI.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rally_app::{AppConfig, LoggingConfig, Screen};
use rally_core::SemanticVersion;
use rally_nav::{ConfigSerializer, DecodeError, ScreenConfig};

#[derive(Parser)]
#[command(name = "rally-host", about = "Inspect Rally navigation state and config files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a persisted navigation history
    Inspect {
        /// State file written by the app
        path: PathBuf,
        /// Print the history as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load, env-merge and validate a config file
    CheckConfig {
        /// TOML config file
        path: PathBuf,
    },
}

/// Exit status when the state file exists but does not decode.
const UNDECODABLE: u8 = 2;

fn main() -> ExitCode {
    rally_app::logging::init(&LoggingConfig {
        level: "warn".to_string(),
        ansi: false,
    });

    let outcome = match Cli::parse().command {
        Command::Inspect { path, json } => inspect(&path, json),
        Command::CheckConfig { path } => check_config(&path).map(|()| ExitCode::SUCCESS),
    };
    outcome.unwrap_or_else(|err| {
        eprintln!("error: {err:#}");
        ExitCode::FAILURE
    })
}

fn inspect(path: &Path, json: bool) -> Result<ExitCode> {
    let schema: SemanticVersion = Screen::SCHEMA;

    match decode_state(path)? {
        Ok(history) if json => {
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        Ok(history) => {
            println!("schema {schema}, {} entries (bottom first):", history.len());
            for (depth, screen) in history.iter().enumerate() {
                println!("  {depth:>2}  {:<10} {screen:?}", screen.tag());
            }
        }
        Err(err) => {
            println!("undecodable state ({err}); the app would start fresh");
            return Ok(ExitCode::from(UNDECODABLE));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Read `path` and decode it as a history. Unreadable files are errors;
/// undecodable contents are reported in the inner result.
fn decode_state(path: &Path) -> Result<std::result::Result<Vec<Screen>, DecodeError>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ConfigSerializer::<Screen>::new().deserialize_history(&bytes))
}

fn check_config(path: &Path) -> Result<()> {
    let config = AppConfig::load_validated(path)
        .with_context(|| format!("checking {}", path.display()))?;
    println!(
        "ok: initial screen {:?}, state {}, logging \"{}\"",
        config.initial_screen,
        config
            .state_path
            .as_ref()
            .map_or_else(|| "not persisted".to_string(), |p| p.display().to_string()),
        config.logging.level,
    );
    Ok(())
}
