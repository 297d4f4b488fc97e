// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Webhook Notifier
//!
//! Posts a JSON summary of each terminal deployment to a configured webhook
//! endpoint. Strictly fire-and-forget from the orchestrator's perspective:
//! delivery failures are returned to the caller only so it can log them.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::domain::application::Application;
use crate::domain::deployment::DeploymentResult;
use crate::domain::notifier::{Notifier, NotifyError};

#[derive(Debug, Serialize)]
struct DeploymentNotification<'a> {
    application: &'a str,
    slug: &'a str,
    kind: &'a str,
    success: bool,
    status: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, app: &Application, result: &DeploymentResult) -> Result<(), NotifyError> {
        let payload = DeploymentNotification {
            application: &app.name,
            slug: &app.slug,
            kind: app.kind.as_str(),
            success: result.success,
            status: result.status.as_str(),
            message: &result.message,
            url: result.url.as_deref(),
        };

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Delivery(format!(
                "webhook returned {}",
                response.status()
            )))
        }
    }
}
