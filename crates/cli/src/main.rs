//! falconctl - Falcon BMS telemetry CLI
//!
//! Lists the telemetry values the provider serves, decodes captured frames and
//! watches live values from the simulator's shared memory.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::WatchOptions;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "falconctl")]
#[command(about = "Falcon BMS telemetry CLI - inspect and watch flight telemetry")]
#[command(version)]
#[command(long_about = "
falconctl hosts the Falcon BMS telemetry provider from the command line.
It lists every resolvable value name, decodes captured FlightData frames and
prints live values, including angular rates, while the simulator is running.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every telemetry value name
    Names,

    /// Decode a captured frame and print every value
    Decode {
        /// Frame file written by `capture`
        file: PathBuf,
    },

    /// Start the provider and print values for each update
    Watch {
        /// Value to print (repeatable)
        #[arg(long = "value", short = 'n')]
        values: Vec<String>,

        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        duration_secs: Option<u64>,

        /// Provider configuration (YAML)
        #[arg(long, env = "FALCONCTL_CONFIG")]
        config: Option<PathBuf>,

        /// Read frames from this file instead of shared memory
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Read one frame from the source and save it
    Capture {
        /// Output path
        out: PathBuf,

        /// Provider configuration (YAML)
        #[arg(long, env = "FALCONCTL_CONFIG")]
        config: Option<PathBuf>,

        /// Read the frame from this file instead of shared memory
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("falconctl={log_level},falcon_telemetry_bms={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Names => commands::names(cli.json),
        Commands::Decode { file } => commands::decode(file, cli.json),
        Commands::Watch {
            values,
            duration_secs,
            config,
            file,
        } => {
            let options = WatchOptions {
                values,
                duration_secs: *duration_secs,
                config: config.as_deref(),
                file: file.as_deref(),
            };
            commands::watch(options, cli.json).await
        }
        Commands::Capture { out, config, file } => {
            commands::capture(out, config.as_deref(), file.as_deref(), cli.json)
        }
    }
}
