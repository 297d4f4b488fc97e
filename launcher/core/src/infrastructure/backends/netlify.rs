// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Netlify Deployment Backend
//!
//! Remote-platform deployment via the Netlify deploy API: uploads a zip of
//! the deployable tree (or the already-produced package for archive kinds)
//! to the site's deploys endpoint and returns the platform-issued URL.
//!
//! # API
//!
//! - `POST /api/v1/sites/{site_id}/deploys` with `Content-Type:
//!   application/zip`: creates a deploy from an archive
//!
//! Non-2xx responses normalize to a failed outcome with the response body
//! captured in `logs`; transport failures are `BackendError`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::application::Application;
use crate::domain::artifact::PreparedArtifact;
use crate::domain::backend::{BackendError, DeployBackend, DeployOutcome};
use crate::domain::config::{resolve_secret, NetlifyTarget};
use crate::domain::deployment::Environment;
use crate::infrastructure::archive::zip_directory_to_vec;

use super::deployable_root;

#[derive(Debug, Deserialize)]
struct NetlifyDeployResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    ssl_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug)]
pub struct NetlifyBackend {
    client: Client,
    api_base: String,
    site_id: String,
    token: String,
}

impl NetlifyBackend {
    pub fn new(target: &NetlifyTarget) -> Result<Self, BackendError> {
        let token = resolve_secret(&target.token)
            .ok_or_else(|| BackendError::Unavailable("Netlify token not configured".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_base: target.api_base.trim_end_matches('/').to_string(),
            site_id: target.site_id.clone(),
            token,
        })
    }

    async fn deploy_archive(&self, app: &Application, body: Vec<u8>) -> Result<DeployOutcome, BackendError> {
        let url = format!("{}/api/v1/sites/{}/deploys", self.api_base, self.site_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/zip")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(DeployOutcome::failed(
                format!("HTTP {}: {}", status, body),
                format!("Netlify rejected the deploy of {}", app.slug),
            ));
        }

        let deploy: NetlifyDeployResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Unavailable(format!("Invalid deploy response: {}", e)))?;
        let site_url = deploy.ssl_url.or(deploy.url);

        Ok(DeployOutcome::succeeded(
            site_url,
            format!("Netlify deploy id: {}", deploy.id.as_deref().unwrap_or("unknown")),
            format!("Deployed {} to Netlify", app.slug),
        ))
    }
}

#[async_trait]
impl DeployBackend for NetlifyBackend {
    fn name(&self) -> &'static str {
        "netlify"
    }

    async fn deploy(
        &self,
        app: &Application,
        _environment: Environment,
        artifact: &PreparedArtifact,
    ) -> Result<DeployOutcome, BackendError> {
        let body = match &artifact.package {
            Some(package) => tokio::fs::read(package).await?,
            None => {
                let root = deployable_root(app, artifact);
                tokio::task::spawn_blocking(move || zip_directory_to_vec(&root))
                    .await
                    .map_err(|e| BackendError::Io(e.to_string()))?
                    .map_err(|e| BackendError::Io(e.to_string()))?
            }
        };

        tracing::info!(slug = %app.slug, bytes = body.len(), "Uploading archive to Netlify");
        self.deploy_archive(app, body).await
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

    fn artifact_with_build(temp: &TempDir) -> PreparedArtifact {
        let dir = temp.path().join("demo");
        std::fs::create_dir_all(dir.join("build")).unwrap();
        std::fs::write(dir.join("build/index.html"), b"<html>").unwrap();
        PreparedArtifact::directory(dir)
    }

    fn backend(server: &mockito::ServerGuard) -> NetlifyBackend {
        NetlifyBackend::new(&NetlifyTarget {
            api_base: server.url(),
            token: "tok_test".to_string(),
            site_id: "site-1".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_successful_deploy_returns_platform_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/sites/site-1/deploys")
            .match_header("authorization", "Bearer tok_test")
            .match_header("content-type", "application/zip")
            .with_status(200)
            .with_body(r#"{"id":"d-1","ssl_url":"https://demo.netlify.app"}"#)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let outcome = backend(&server)
            .deploy(&app(), Environment::Staging, &artifact_with_build(&temp))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.url.as_deref(), Some("https://demo.netlify.app"));
        assert!(outcome.logs.contains("d-1"));
    }

    #[tokio::test]
    async fn test_rejected_deploy_normalizes_to_failed_outcome() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/sites/site-1/deploys")
            .with_status(422)
            .with_body(r#"{"message":"zip too large"}"#)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let outcome = backend(&server)
            .deploy(&app(), Environment::Staging, &artifact_with_build(&temp))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.url.is_none());
        assert!(outcome.logs.contains("422"));
        assert!(outcome.logs.contains("zip too large"));
    }

    #[tokio::test]
    async fn test_existing_package_is_uploaded_as_is() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/sites/site-1/deploys")
            .match_body("not-really-a-zip")
            .with_status(200)
            .with_body(r#"{"id":"d-2","url":"http://demo.netlify.app"}"#)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pkg");
        std::fs::create_dir_all(&dir).unwrap();
        let package = dir.join("demo.zip");
        std::fs::write(&package, b"not-really-a-zip").unwrap();

        let outcome = backend(&server)
            .deploy(
                &app(),
                Environment::Staging,
                &PreparedArtifact::packaged(dir, package),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.url.as_deref(), Some("http://demo.netlify.app"));
    }

    #[test]
    fn test_missing_token_fails_construction() {
        let err = NetlifyBackend::new(&NetlifyTarget {
            api_base: "https://api.netlify.com".to_string(),
            token: "env:AUTOLAUNCH_TEST_UNSET_NETLIFY_TOKEN".to_string(),
            site_id: "site-1".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }
}
