// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vercel Deployment Backend
//!
//! Remote-platform deployment via the Vercel deployments API: the deployable
//! tree is posted as inline base64 files in a single request, and the
//! platform-issued URL comes back on the deployment object.
//!
//! # API
//!
//! - `POST /v13/deployments` with `{name, target, files: [{file, data,
//!   encoding: "base64"}]}`
//!
//! Production launches map to the `production` target; staging and
//! development become previews. Non-2xx responses normalize to a failed
//! outcome; transport failures are `BackendError`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::application::Application;
use crate::domain::artifact::PreparedArtifact;
use crate::domain::backend::{BackendError, DeployBackend, DeployOutcome};
use crate::domain::config::{resolve_secret, VercelTarget};
use crate::domain::deployment::Environment;

use super::deployable_root;

#[derive(Debug, Serialize)]
struct InlineFile {
    file: String,
    data: String,
    encoding: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateDeploymentRequest {
    name: String,
    target: &'static str,
    files: Vec<InlineFile>,
}

#[derive(Debug, Deserialize)]
struct CreateDeploymentResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

pub struct VercelBackend {
    client: Client,
    api_base: String,
    token: String,
    team_id: Option<String>,
}

impl VercelBackend {
    pub fn new(target: &VercelTarget) -> Result<Self, BackendError> {
        let token = resolve_secret(&target.token)
            .ok_or_else(|| BackendError::Unavailable("Vercel token not configured".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_base: target.api_base.trim_end_matches('/').to_string(),
            token,
            team_id: target.team_id.clone(),
        })
    }

    fn target_for(environment: Environment) -> &'static str {
        match environment {
            Environment::Production => "production",
            Environment::Staging | Environment::Development => "preview",
        }
    }

    /// Read the deployable tree into inline base64 upload entries.
    fn collect_files(root: &Path) -> Result<Vec<InlineFile>, std::io::Error> {
        let mut files = Vec::new();
        let mut entries: Vec<_> = walkdir::WalkDir::new(root)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(std::io::Error::other)?;
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        for entry in entries {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(std::io::Error::other)?
                .to_string_lossy()
                .replace('\\', "/");
            let content = std::fs::read(entry.path())?;
            files.push(InlineFile {
                file: rel,
                data: BASE64.encode(content),
                encoding: "base64",
            });
        }
        Ok(files)
    }
}

#[async_trait]
impl DeployBackend for VercelBackend {
    fn name(&self) -> &'static str {
        "vercel"
    }

    async fn deploy(
        &self,
        app: &Application,
        environment: Environment,
        artifact: &PreparedArtifact,
    ) -> Result<DeployOutcome, BackendError> {
        let root = deployable_root(app, artifact);
        let files = tokio::task::spawn_blocking(move || Self::collect_files(&root))
            .await
            .map_err(|e| BackendError::Io(e.to_string()))??;

        let request = CreateDeploymentRequest {
            name: app.slug.clone(),
            target: Self::target_for(environment),
            files,
        };

        let mut builder = self
            .client
            .post(format!("{}/v13/deployments", self.api_base))
            .bearer_auth(&self.token)
            .json(&request);
        if let Some(team_id) = &self.team_id {
            builder = builder.query(&[("teamId", team_id)]);
        }

        tracing::info!(
            slug = %app.slug,
            files = request.files.len(),
            target = request.target,
            "Creating Vercel deployment"
        );
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(DeployOutcome::failed(
                format!("HTTP {}: {}", status, body),
                format!("Vercel rejected the deploy of {}", app.slug),
            ));
        }

        let deployment: CreateDeploymentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Unavailable(format!("Invalid deployment response: {}", e)))?;
        let url = deployment.url.map(|u| {
            if u.starts_with("http") {
                u
            } else {
                format!("https://{}", u)
            }
        });

        Ok(DeployOutcome::succeeded(
            url,
            format!(
                "Vercel deployment id: {}",
                deployment.id.as_deref().unwrap_or("unknown")
            ),
            format!("Deployed {} to Vercel", app.slug),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{ApplicationId, ArtifactKind};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn app() -> Application {
        Application {
            id: ApplicationId::new(),
            kind: ArtifactKind::Website,
            name: "Demo".to_string(),
            slug: "demo".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            author: None,
            approved: true,
            preview_url: None,
            files: BTreeMap::new(),
            wordpress: None,
            extension: None,
            mobile: None,
        }
    }

    fn artifact(temp: &TempDir) -> PreparedArtifact {
        let dir = temp.path().join("demo");
        std::fs::create_dir_all(dir.join("build")).unwrap();
        std::fs::write(dir.join("build/index.html"), b"<html>").unwrap();
        PreparedArtifact::directory(dir)
    }

    fn backend(server: &mockito::ServerGuard) -> VercelBackend {
        VercelBackend::new(&VercelTarget {
            api_base: server.url(),
            token: "tok_v".to_string(),
            team_id: None,
        })
        .unwrap()
    }

    #[test]
    fn test_environment_target_mapping() {
        assert_eq!(VercelBackend::target_for(Environment::Production), "production");
        assert_eq!(VercelBackend::target_for(Environment::Staging), "preview");
        assert_eq!(VercelBackend::target_for(Environment::Development), "preview");
    }

    #[tokio::test]
    async fn test_successful_deploy_normalizes_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v13/deployments")
            .match_header("authorization", "Bearer tok_v")
            .with_status(200)
            .with_body(r#"{"id":"dpl_1","url":"demo-abc123.vercel.app"}"#)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let outcome = backend(&server)
            .deploy(&app(), Environment::Staging, &artifact(&temp))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.url.as_deref(), Some("https://demo-abc123.vercel.app"));
    }

    #[tokio::test]
    async fn test_api_error_normalizes_to_failed_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v13/deployments")
            .with_status(403)
            .with_body(r#"{"error":{"code":"forbidden"}}"#)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let outcome = backend(&server)
            .deploy(&app(), Environment::Production, &artifact(&temp))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.logs.contains("403"));
        assert!(outcome.logs.contains("forbidden"));
    }

    #[test]
    fn test_collect_files_encodes_relative_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("js")).unwrap();
        std::fs::write(temp.path().join("index.html"), b"<html>").unwrap();
        std::fs::write(temp.path().join("js/app.js"), b"1;").unwrap();

        let files = VercelBackend::collect_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file, "index.html");
        assert_eq!(files[1].file, "js/app.js");
        assert_eq!(files[0].data, BASE64.encode(b"<html>"));
        assert_eq!(files[0].encoding, "base64");
    }
}
