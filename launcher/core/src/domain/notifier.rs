// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Notifier Seam
//!
//! Fire-and-forget side channel invoked after a terminal deployment update.
//! The orchestrator logs delivery failures and never lets them alter an
//! already-computed result.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::application::Application;
use crate::domain::deployment::DeploymentResult;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, app: &Application, result: &DeploymentResult) -> Result<(), NotifyError>;
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Delivery(err.to_string())
    }
}
