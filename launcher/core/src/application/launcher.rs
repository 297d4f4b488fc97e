// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Orchestrator
//!
//! Validates preconditions (enablement, approval gating), then sequences
//! Preparer → Backend → Record → Notifier and returns the final result.
//! `launch` never raises past its boundary: preparer and backend failures
//! are downgraded to structured failed results, and the deployment record
//! receives exactly one terminal update either way. Gate outcomes short-
//! circuit before any side effect: no record, no filesystem writes.
//!
//! The deploy-and-record leg runs as a spawned task that `launch` awaits.
//! A caller that times out and drops the future therefore does not kill a
//! dispatched backend call: the task keeps running and the terminal record
//! update still applies the real outcome when it resolves.

use std::sync::Arc;

use thiserror::Error;

use crate::application::preparer::ArtifactPreparer;
use crate::domain::application::Application;
use crate::domain::artifact::PrepareError;
use crate::domain::backend::{BackendError, DeployOutcome};
use crate::domain::config::ConfigHandle;
use crate::domain::deployment::{DeploymentRecord, DeploymentResult, Environment};
use crate::domain::notifier::Notifier;
use crate::domain::repository::DeploymentRepository;
use crate::infrastructure::backends::BackendRegistry;

/// Failures on the launch path. Callers never see these: each is converted
/// into a failed [`DeploymentResult`] carrying the error text.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Unsupported deployment method: {0}")]
    UnsupportedDeploymentMethod(String),

    #[error(transparent)]
    Prepare(#[from] PrepareError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct AutoLaunchService {
    config: Arc<ConfigHandle>,
    preparer: Arc<ArtifactPreparer>,
    backends: Arc<BackendRegistry>,
    records: Arc<dyn DeploymentRepository>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl AutoLaunchService {
    pub fn new(
        config: Arc<ConfigHandle>,
        preparer: Arc<ArtifactPreparer>,
        backends: Arc<BackendRegistry>,
        records: Arc<dyn DeploymentRepository>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            config,
            preparer,
            backends,
            records,
            notifier,
        }
    }

    /// Launch one application. Always returns a result, never an error.
    ///
    /// The configuration snapshot is taken once at entry; a concurrent
    /// reload does not affect a launch already in flight.
    pub async fn launch(
        &self,
        app: &Application,
        environment: Option<Environment>,
    ) -> DeploymentResult {
        let config = self.config.snapshot();

        if !config.auto_deploy_enabled {
            tracing::info!(slug = %app.slug, "Launch skipped: auto-deploy disabled");
            return DeploymentResult::disabled();
        }

        let environment = environment.unwrap_or(config.default_environment);

        if environment == Environment::Production && config.require_approval && !app.approved {
            tracing::info!(slug = %app.slug, "Launch gated: production deployment requires approval");
            return DeploymentResult::pending_approval();
        }

        tracing::info!(
            slug = %app.slug,
            kind = %app.kind,
            environment = %environment,
            method = %config.deployment_method,
            "Starting auto-launch"
        );

        let record = DeploymentRecord::new(app, environment, config.deployment_method.clone());
        let record_id = record.id;
        if let Err(e) = self.records.create(&record).await {
            // Without a record there is no audit trail for this attempt, so
            // the run stops before touching the filesystem or any target.
            tracing::error!(slug = %app.slug, error = %e, "Failed to create deployment record");
            return DeploymentResult::failed(
                format!("Record persistence error: {}", e),
                String::new(),
                None,
            );
        }

        let task = tokio::spawn(Self::deploy_and_finish(
            self.preparer.clone(),
            self.backends.clone(),
            self.records.clone(),
            app.clone(),
            environment,
            config.deployment_method.clone(),
            record,
        ));

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(slug = %app.slug, deployment_id = %record_id, error = %e, "Deployment task aborted");
                DeploymentResult::failed(
                    format!("Deployment task failed: {}", e),
                    String::new(),
                    Some(record_id),
                )
            }
        };

        if config.notify_on_deployment {
            self.notify_best_effort(app, &result).await;
        }

        tracing::info!(
            slug = %app.slug,
            deployment_id = %record_id,
            success = result.success,
            status = result.status.as_str(),
            "Auto-launch finished"
        );
        result
    }

    /// The deploy-and-record leg. Owns everything it needs so it survives
    /// the caller abandoning `launch`: the record always reaches a terminal
    /// state with the real outcome.
    async fn deploy_and_finish(
        preparer: Arc<ArtifactPreparer>,
        backends: Arc<BackendRegistry>,
        records: Arc<dyn DeploymentRepository>,
        app: Application,
        environment: Environment,
        method: String,
        mut record: DeploymentRecord,
    ) -> DeploymentResult {
        let outcome = Self::run_deployment(&preparer, &backends, &app, environment, &method).await;

        let result = match outcome {
            Ok(outcome) => {
                if outcome.success {
                    record.complete(outcome.url.clone(), outcome.logs.clone());
                    DeploymentResult::deployed(outcome.message, outcome.url, outcome.logs, record.id)
                } else {
                    record.fail(outcome.logs.clone());
                    DeploymentResult::failed(outcome.message, outcome.logs, Some(record.id))
                }
            }
            Err(e) => {
                tracing::warn!(slug = %app.slug, deployment_id = %record.id, error = %e, "Launch failed");
                record.fail(e.to_string());
                DeploymentResult::failed(
                    format!("Deployment failed: {}", e),
                    e.to_string(),
                    Some(record.id),
                )
            }
        };

        Self::finish_record(&records, &record, result).await
    }

    async fn run_deployment(
        preparer: &ArtifactPreparer,
        backends: &BackendRegistry,
        app: &Application,
        environment: Environment,
        method: &str,
    ) -> Result<DeployOutcome, LaunchError> {
        let backend = backends
            .resolve(method)
            .ok_or_else(|| LaunchError::UnsupportedDeploymentMethod(method.to_string()))?;

        let artifact = preparer.prepare(app).await?;
        let outcome = backend.deploy(app, environment, &artifact).await?;
        Ok(outcome)
    }

    /// Apply the terminal record update. A persistence failure here must not
    /// hide the real deployment outcome, but it is a durability gap and is
    /// surfaced distinctly on the returned result.
    async fn finish_record(
        records: &Arc<dyn DeploymentRepository>,
        record: &DeploymentRecord,
        mut result: DeploymentResult,
    ) -> DeploymentResult {
        match records.finish(record).await {
            Ok(()) => result,
            Err(e) => {
                tracing::error!(
                    deployment_id = %record.id,
                    error = %e,
                    "Failed to persist terminal deployment update"
                );
                result.message = format!("{} (record persistence error: {})", result.message, e);
                result
            }
        }
    }

    async fn notify_best_effort(&self, app: &Application, result: &DeploymentResult) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if let Err(e) = notifier.notify(app, result).await {
            // Best-effort side channel: log and move on, the result stands.
            tracing::warn!(slug = %app.slug, error = %e, "Deployment notification failed");
        }
    }
}
