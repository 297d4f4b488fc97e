// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Record & Result
//!
//! One `DeploymentRecord` per launch attempt. Status transitions are
//! monotonic and one-directional: `in_progress` → `deployed` | `failed`,
//! both terminal, never re-opened. Gated launches (disabled configuration,
//! pending approval) surface a result status only: no record is ever
//! created for them, so they never enter deployment history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::application::{Application, ApplicationId, ArtifactKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(pub Uuid);

impl DeploymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeploymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{}'. Expected development, staging or production",
                other
            )),
        }
    }
}

/// Persisted record status. `pending_approval` is deliberately absent: it is
/// a result-only status and is never written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    InProgress,
    Deployed,
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::InProgress => "in_progress",
            DeploymentStatus::Deployed => "deployed",
            DeploymentStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::InProgress)
    }
}

/// One launch attempt. Created `in_progress`, mutated exactly twice over its
/// lifetime: creation and a single terminal update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: DeploymentId,
    pub application_id: ApplicationId,
    pub kind: ArtifactKind,
    pub environment: Environment,
    pub method: String,
    pub status: DeploymentStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub deployed_url: Option<String>,
    pub logs: String,
}

impl DeploymentRecord {
    pub fn new(app: &Application, environment: Environment, method: impl Into<String>) -> Self {
        Self {
            id: DeploymentId::new(),
            application_id: app.id,
            kind: app.kind,
            environment,
            method: method.into(),
            status: DeploymentStatus::InProgress,
            started_at: Utc::now(),
            ended_at: None,
            deployed_url: None,
            logs: String::new(),
        }
    }

    /// Terminal transition to `deployed`. Idempotent: once a record is
    /// terminal, further transitions are no-ops and the end time is kept.
    pub fn complete(&mut self, url: Option<String>, logs: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = DeploymentStatus::Deployed;
        self.ended_at = Some(Utc::now());
        self.deployed_url = url;
        self.logs = logs.into();
    }

    /// Terminal transition to `failed`. Idempotent like [`complete`].
    ///
    /// [`complete`]: DeploymentRecord::complete
    pub fn fail(&mut self, logs: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = DeploymentStatus::Failed;
        self.ended_at = Some(Utc::now());
        self.logs = logs.into();
    }
}

/// Status label carried on the result returned to the caller. Superset of
/// the persisted statuses: gate outcomes exist only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    Disabled,
    PendingApproval,
    Deployed,
    Failed,
}

impl LaunchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchStatus::Disabled => "disabled",
            LaunchStatus::PendingApproval => "pending_approval",
            LaunchStatus::Deployed => "deployed",
            LaunchStatus::Failed => "failed",
        }
    }
}

/// The value every `launch` call returns. Ephemeral: the record is the
/// persisted counterpart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub success: bool,
    pub status: LaunchStatus,
    pub message: String,
    pub url: Option<String>,
    pub logs: String,
    /// Absent for gated launches, which never create a record.
    pub deployment: Option<DeploymentId>,
}

impl DeploymentResult {
    pub fn disabled() -> Self {
        Self {
            success: false,
            status: LaunchStatus::Disabled,
            message: "Auto-deploy is disabled in configuration".to_string(),
            url: None,
            logs: String::new(),
            deployment: None,
        }
    }

    pub fn pending_approval() -> Self {
        Self {
            success: false,
            status: LaunchStatus::PendingApproval,
            message: "Production deployment requires approval".to_string(),
            url: None,
            logs: String::new(),
            deployment: None,
        }
    }

    pub fn deployed(
        message: impl Into<String>,
        url: Option<String>,
        logs: impl Into<String>,
        deployment: DeploymentId,
    ) -> Self {
        Self {
            success: true,
            status: LaunchStatus::Deployed,
            message: message.into(),
            url,
            logs: logs.into(),
            deployment: Some(deployment),
        }
    }

    pub fn failed(
        message: impl Into<String>,
        logs: impl Into<String>,
        deployment: Option<DeploymentId>,
    ) -> Self {
        Self {
            success: false,
            status: LaunchStatus::Failed,
            message: message.into(),
            url: None,
            logs: logs.into(),
            deployment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn app() -> Application {
        Application {
            id: ApplicationId::new(),
            kind: ArtifactKind::Website,
            name: "Demo".to_string(),
            slug: "demo".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            author: None,
            approved: false,
            preview_url: None,
            files: BTreeMap::new(),
            wordpress: None,
            extension: None,
            mobile: None,
        }
    }

    #[test]
    fn test_record_starts_in_progress() {
        let record = DeploymentRecord::new(&app(), Environment::Staging, "docker");
        assert_eq!(record.status, DeploymentStatus::InProgress);
        assert!(record.ended_at.is_none());
        assert!(record.deployed_url.is_none());
    }

    #[test]
    fn test_complete_is_terminal_and_idempotent() {
        let mut record = DeploymentRecord::new(&app(), Environment::Staging, "docker");
        record.complete(Some("http://localhost:8080".to_string()), "ok");

        assert_eq!(record.status, DeploymentStatus::Deployed);
        let first_end = record.ended_at.expect("end time set");

        // A repeated terminal update must not overwrite anything.
        record.complete(Some("http://other".to_string()), "different");
        assert_eq!(record.ended_at, Some(first_end));
        assert_eq!(record.deployed_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(record.logs, "ok");

        // A record is never re-opened, not even into the other terminal state.
        record.fail("late failure");
        assert_eq!(record.status, DeploymentStatus::Deployed);
    }

    #[test]
    fn test_fail_sets_end_time() {
        let mut record = DeploymentRecord::new(&app(), Environment::Production, "netlify");
        record.fail("upload rejected");
        assert_eq!(record.status, DeploymentStatus::Failed);
        assert!(record.ended_at.is_some());
        assert_eq!(record.logs, "upload rejected");
    }

    #[test]
    fn test_status_strings_match_wire_format() {
        assert_eq!(DeploymentStatus::InProgress.as_str(), "in_progress");
        assert_eq!(LaunchStatus::PendingApproval.as_str(), "pending_approval");
        let json = serde_json::to_string(&DeploymentStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_gate_results_carry_no_record() {
        assert!(DeploymentResult::disabled().deployment.is_none());
        assert!(DeploymentResult::pending_approval().deployment.is_none());
        assert!(!DeploymentResult::pending_approval().success);
    }
}
