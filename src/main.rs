//! tuideck CLI
//!
//! Runs the demo deck in the terminal.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use tuideck::config::{DeckConfig, DemoId, WrapPolicy};
use tuideck::logging;

#[derive(Parser)]
#[command(name = "tuideck")]
#[command(about = "Elm-style terminal UI demos, one after another")]
#[command(version)]
struct Cli {
    /// Demo to start with
    #[arg(value_enum, default_value_t = DemoId::Spinners)]
    demo: DemoId,

    /// What to do after the last demo finishes
    #[arg(long, value_enum, default_value_t = WrapPolicy::Cycle)]
    on_last: WrapPolicy,

    /// Seed for the layout demos (default: derived from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Write structured logs to this file
    #[arg(long, env = "TUIDECK_LOG")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> DeckConfig {
        DeckConfig {
            initial: self.demo,
            on_last: self.on_last,
            seed: self.seed.unwrap_or_else(clock_seed),
            log_file: self.log_file,
        }
    }
}

fn clock_seed() -> u64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

fn main() -> ExitCode {
    let config = Cli::parse().into_config();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DeckConfig) -> Result<(), String> {
    logging::init(config.log_file.as_deref()).map_err(|e| e.to_string())?;
    tracing::info!(seed = config.seed, "starting");
    tuideck::tui::run(config).map_err(|e| format!("terminal error: {}", e))
}

// ============================================================================
// TESTS
// ============================================================================
