// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use autolaunch_core::domain::config::LaunchConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./autolaunch.yaml")]
        output: PathBuf,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate { output } => generate(output),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = LaunchConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. AUTOLAUNCH_CONFIG_PATH: {}",
            std::env::var("AUTOLAUNCH_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./autolaunch.yaml");
        println!("  4. ~/.autolaunch/config.yaml");
        println!("  5. /etc/autolaunch/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();
    println!("  Auto-deploy enabled: {}", config.auto_deploy_enabled);
    println!("  Default environment: {}", config.default_environment);
    println!("  Deployment method: {}", config.deployment_method.bold());
    println!("  Require approval: {}", config.require_approval);
    println!("  Notify on deployment: {}", config.notify_on_deployment);
    println!("  Base URL: {}", config.base_url);
    println!("  Scratch root: {}", config.scratch_root.display());
    println!();

    println!("{}", "Targets:".bold());
    println!("  docker: image prefix {}", config.targets.docker.image_prefix);
    if let Some(github) = &config.targets.github {
        println!("  github: {} ({})", github.remote, github.branch);
    }
    if let Some(vercel) = &config.targets.vercel {
        println!("  vercel: {}", vercel.api_base);
    }
    if let Some(netlify) = &config.targets.netlify {
        println!("  netlify: site {}", netlify.site_id);
    }

    Ok(())
}

fn validate(file: Option<PathBuf>) -> Result<()> {
    let config = LaunchConfig::load_or_default(file).context("Failed to load configuration")?;
    config.validate()?;
    println!("{} configuration is valid", "✓".green().bold());
    Ok(())
}

fn generate(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("{} already exists, refusing to overwrite", output.display());
    }
    let config = LaunchConfig::default();
    let yaml = serde_yaml::to_string(&config)?;
    std::fs::write(&output, yaml)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} wrote sample configuration to {}", "✓".green().bold(), output.display());
    Ok(())
}
