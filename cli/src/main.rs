// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AutoLaunch CLI
//!
//! The `autolaunch` binary drives the deployment orchestrator from the
//! command line: it loads the launch configuration, wires the core services
//! together, and launches one application document against the configured
//! deployment method.
//!
//! ## Commands
//!
//! - `autolaunch launch --app <file>` - Prepare and deploy an application
//! - `autolaunch config show|validate|generate` - Configuration management
//! - `autolaunch methods` - List deployment backends available on this node

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{ConfigCommand, LaunchArgs};

/// AutoLaunch Studio - assemble and deploy applications
#[derive(Parser)]
#[command(name = "autolaunch")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AUTOLAUNCH_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AUTOLAUNCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare and deploy an application
    Launch(LaunchArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// List deployment backends available on this node
    Methods,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    match cli.command {
        Commands::Launch(args) => commands::launch::run(args, cli.config).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
        Commands::Methods => commands::launch::list_methods(cli.config).await,
    }
}
