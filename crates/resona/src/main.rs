// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resona - a conversational reflection companion.
//!
//! This is the binary entry point for the Resona server.

use clap::{Parser, Subcommand};

mod serve;
mod status;

/// Resona - a conversational reflection companion.
#[derive(Parser, Debug)]
#[command(name = "resona", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Resona reflection server.
    Serve,
    /// Show whether a running server is healthy.
    Status {
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match resona_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            resona_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status { json }) => status::run_status(&config, json).await,
        None => {
            println!("resona: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
