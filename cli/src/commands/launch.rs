// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Launch command: wires the core services and drives one deployment.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use autolaunch_core::application::{ArtifactPreparer, AutoLaunchService};
use autolaunch_core::domain::application::Application;
use autolaunch_core::domain::artifact::SiteBuilder;
use autolaunch_core::domain::config::{ConfigHandle, LaunchConfig};
use autolaunch_core::domain::deployment::Environment;
use autolaunch_core::domain::notifier::Notifier;
use autolaunch_core::domain::repository::DeploymentRepository;
use autolaunch_core::infrastructure::backends::BackendRegistry;
use autolaunch_core::infrastructure::notify::WebhookNotifier;
use autolaunch_core::infrastructure::repositories::{
    InMemoryDeploymentRepository, PostgresDeploymentRepository,
};
use autolaunch_core::infrastructure::site_builder::{CommandSiteBuilder, PassthroughSiteBuilder};
use autolaunch_core::infrastructure::store::FsArtifactStore;

#[derive(Args)]
pub struct LaunchArgs {
    /// Application document (YAML)
    #[arg(long, value_name = "FILE")]
    pub app: PathBuf,

    /// Target environment (development, staging, production)
    #[arg(long, value_name = "ENV")]
    pub environment: Option<String>,

    /// Root directory holding application file content
    #[arg(long, default_value = "content", value_name = "DIR")]
    pub content_root: PathBuf,
}

pub async fn run(args: LaunchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = LaunchConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let environment = args
        .environment
        .as_deref()
        .map(str::parse::<Environment>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let document = std::fs::read_to_string(&args.app)
        .with_context(|| format!("Failed to read application document {}", args.app.display()))?;
    let app: Application =
        serde_yaml::from_str(&document).context("Failed to parse application document")?;

    let service = build_service(&config, &args.content_root).await?;
    let result = service.launch(&app, environment).await;

    println!();
    if result.success {
        println!("{} {}", "✓".green().bold(), result.message.bold());
    } else {
        println!("{} {}", "✗".red().bold(), result.message.bold());
    }
    println!("  Status: {}", result.status.as_str());
    if let Some(url) = &result.url {
        println!("  URL: {}", url.underline());
    }
    if let Some(deployment) = &result.deployment {
        println!("  Deployment: {}", deployment);
    }
    if !result.logs.is_empty() {
        println!();
        println!("{}", "Logs:".bold());
        for line in result.logs.lines() {
            println!("  {}", line.dimmed());
        }
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

pub async fn list_methods(config_path: Option<PathBuf>) -> Result<()> {
    let config = LaunchConfig::load_or_default(config_path).context("Failed to load configuration")?;
    let registry = BackendRegistry::from_config(&config);

    println!("{}", "Registered deployment methods:".bold());
    for name in registry.names() {
        if name == config.deployment_method {
            println!("  {} {}", name.bold(), "(configured)".dimmed());
        } else {
            println!("  {}", name);
        }
    }
    if registry.resolve(&config.deployment_method).is_none() {
        println!();
        println!(
            "{} configured method '{}' has no registered backend",
            "warning:".yellow().bold(),
            config.deployment_method
        );
    }
    Ok(())
}

async fn build_service(config: &LaunchConfig, content_root: &PathBuf) -> Result<AutoLaunchService> {
    let store = Arc::new(FsArtifactStore::new(content_root.clone()));

    let site_builder: Arc<dyn SiteBuilder> = match &config.website_build_command {
        Some(command) => Arc::new(
            CommandSiteBuilder::new(command).map_err(|e| anyhow::anyhow!(e.to_string()))?,
        ),
        None => Arc::new(PassthroughSiteBuilder),
    };

    let preparer = Arc::new(ArtifactPreparer::new(
        store,
        site_builder,
        config.scratch_root.clone(),
    ));

    let registry = Arc::new(BackendRegistry::from_config(config));

    let records: Arc<dyn DeploymentRepository> = match &config.database_url {
        Some(url) => Arc::new(
            PostgresDeploymentRepository::connect(url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?,
        ),
        None => Arc::new(InMemoryDeploymentRepository::new()),
    };

    let notifier: Option<Arc<dyn Notifier>> = config
        .notify_webhook
        .as_ref()
        .map(|endpoint| Arc::new(WebhookNotifier::new(endpoint.clone())) as Arc<dyn Notifier>);

    Ok(AutoLaunchService::new(
        Arc::new(ConfigHandle::new(config.clone())),
        preparer,
        registry,
        records,
        notifier,
    ))
}
