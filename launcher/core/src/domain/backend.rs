// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Backend Contract
//!
//! The capability interface every deployment target implements. Backends own
//! their failure taxonomy internally but normalize every completed deploy to
//! the shared [`DeployOutcome`] shape: a rejected upload or a non-zero build
//! exit is `success = false` with the raw diagnostics in `logs`, not an
//! error. [`BackendError`] is reserved for infrastructure faults where no
//! deploy attempt could be made at all (daemon unreachable, transport down).
//! The orchestrator treats all backends uniformly.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::application::Application;
use crate::domain::artifact::PreparedArtifact;
use crate::domain::deployment::Environment;

/// Normalized result of one deploy attempt.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub success: bool,
    /// Reachable URL of the deployed artifact, when the target issues one.
    pub url: Option<String>,
    /// Raw diagnostic output (build log, API response body, process output).
    pub logs: String,
    /// Short human summary.
    pub message: String,
}

impl DeployOutcome {
    pub fn succeeded(url: Option<String>, logs: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            url,
            logs: logs.into(),
            message: message.into(),
        }
    }

    pub fn failed(logs: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            logs: logs.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Deployment target unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Unavailable(err.to_string())
    }
}

/// One deployment execution strategy. Implementations are registered at
/// startup under their method name and resolved by straight lookup.
#[async_trait]
pub trait DeployBackend: Send + Sync {
    /// Method name used as the registry key (e.g. "docker", "netlify").
    fn name(&self) -> &'static str;

    /// Deploy the prepared artifact. Completed-but-failed deploys come back
    /// as `Ok` outcomes with `success = false`.
    async fn deploy(
        &self,
        app: &Application,
        environment: Environment,
        artifact: &PreparedArtifact,
    ) -> Result<DeployOutcome, BackendError>;
}
