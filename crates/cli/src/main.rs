// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wf`: command-line client for the fuzz-run daemon

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod exit_error;
mod output;

use std::net::SocketAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "wf", version, about = "Supervise WordPress plugin fuzz runs")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    /// Daemon address (default: WF_BIND_ADDR:WF_HTTP_PORT)
    #[arg(long, global = true)]
    addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start fuzzing a plugin
    Fuzz {
        /// Plugin slug, e.g. akismet
        slug: String,
    },
    /// Print whether a run is in progress (NOT_STARTED or FUZZING)
    State,
    /// List plugins with archived results
    History,
    /// Print the archived results for a plugin
    Result {
        /// Plugin slug
        slug: String,
        /// Export the command results as CSV
        #[arg(long)]
        csv: bool,
    },
    /// Show daemon and fuzzer environment status
    Status,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("error: {}", exit.message);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = match cli.addr {
        Some(addr) => DaemonClient::new(addr),
        None => DaemonClient::from_env(),
    };
    let format = cli.output;

    match cli.command {
        Commands::Fuzz { slug } => commands::fuzz::handle(&client, &slug, format).await,
        Commands::State => commands::state::handle(&client, format).await,
        Commands::History => commands::history::handle(&client, format).await,
        Commands::Result { slug, csv } => commands::result::handle(&client, &slug, csv).await,
        Commands::Status => commands::status::handle(&client, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
