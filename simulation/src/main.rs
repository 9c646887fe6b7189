//! cgr-sim - run candidate-route scenarios from the command line

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};

use cgr_logging::{CgrSubscriberBuilder, LogConfig};
use cgr_routing::CgrConfig;
use cgr_simulation::Scenario;

#[derive(Parser)]
#[command(
    name = "cgr-sim",
    about = "Contact graph routing candidate-route simulator",
    version
)]
struct Cli {
    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a routing pass and print the candidate routes
    Run {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Engine preset: suggested, sabr or enhanced
        #[arg(short, long)]
        preset: Option<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a scenario file without running it
    Validate {
        /// Scenario file (JSON)
        scenario: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::development().with_verbosity(cli.verbose);
    if cli.verbose == 0 {
        log_config.default_level = "warn".to_string();
    }
    log_config.console.stderr = true;
    let _guard = CgrSubscriberBuilder::new()
        .with_config(log_config)
        .try_init()
        .context("initializing logging")?;

    match cli.command {
        Commands::Run {
            scenario,
            preset,
            json,
        } => {
            let config = preset
                .map(|name| {
                    CgrConfig::preset(&name).ok_or_else(|| anyhow!("unknown preset: {name}"))
                })
                .transpose()?;
            let scenario = Scenario::load(&scenario)?;
            let outcome = scenario.run(config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("Scenario: {}", outcome.scenario);
                println!(
                    "Pass {} after {} enumerator request(s): {} neighbor(s) found, {} suppressed",
                    outcome.state, outcome.requests, outcome.neighbors_found, outcome.suppressed
                );
                print!("{}", outcome.report);
            }
        }
        Commands::Validate { scenario } => {
            let loaded = Scenario::load(&scenario)?;
            loaded.validate()?;
            println!(
                "{}: {} contacts, {} rounds - ok",
                scenario.display(),
                loaded.contacts.len(),
                loaded.rounds.len()
            );
        }
    }

    Ok(())
}
