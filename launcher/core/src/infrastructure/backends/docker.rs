// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Docker Deployment Backend
//!
//! Container-based deployment: tars the deployable tree into a build
//! context (synthesizing a static-server Dockerfile when the artifact does
//! not carry one), builds an image through the Docker API, and runs it as a
//! container with an ephemeral published port. The returned URL points at
//! the local port mapping.
//!
//! Failure normalization: daemon connectivity problems are `BackendError`;
//! a build or start that the daemon rejects is a completed-but-failed deploy
//! (`success = false` with the streamed build log in `logs`).

use async_trait::async_trait;
use bollard::container::{Config, CreateContainerOptions, RemoveContainerOptions, StartContainerOptions};
use bollard::image::BuildImageOptions;
use bollard::service::{HostConfig, PortBinding};
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::application::Application;
use crate::domain::artifact::PreparedArtifact;
use crate::domain::backend::{BackendError, DeployBackend, DeployOutcome};
use crate::domain::config::DockerTarget;
use crate::domain::deployment::Environment;

use super::deployable_root;

const CONTAINER_PORT: &str = "80/tcp";

/// Fallback Dockerfile for artifacts that do not ship their own: serve the
/// tree as static content.
const STATIC_DOCKERFILE: &str = "FROM nginx:alpine\nCOPY . /usr/share/nginx/html\n";

pub struct DockerBackend {
    docker: Docker,
    image_prefix: String,
    network_mode: Option<String>,
}

impl DockerBackend {
    pub fn new(target: &DockerTarget) -> Result<Self, BackendError> {
        // Connect to Docker daemon (custom socket or auto-detect)
        let docker = if let Some(path) = &target.socket_path {
            Docker::connect_with_unix(path, 120, bollard::API_DEFAULT_VERSION).map_err(|e| {
                BackendError::Unavailable(format!("Failed to connect to Docker at {}: {}", path, e))
            })?
        } else {
            Docker::connect_with_local_defaults().map_err(|e| {
                BackendError::Unavailable(format!(
                    "Failed to connect to Docker: {}. Ensure the daemon is running (check: docker ps)",
                    e
                ))
            })?
        };

        Ok(Self {
            docker,
            image_prefix: target.image_prefix.clone(),
            network_mode: target.network_mode.clone(),
        })
    }

    /// Verify the Docker daemon is accessible.
    pub async fn healthcheck(&self) -> Result<(), BackendError> {
        self.docker
            .ping()
            .await
            .map_err(|e| BackendError::Unavailable(format!("Docker healthcheck failed: {}", e)))?;
        Ok(())
    }

    /// Build the tar build context, injecting the fallback Dockerfile when
    /// the tree has none.
    fn build_context(root: &Path) -> Result<Vec<u8>, BackendError> {
        let mut builder = tar::Builder::new(Vec::new());
        builder
            .append_dir_all(".", root)
            .map_err(|e| BackendError::Io(format!("Failed to tar build context: {}", e)))?;

        if !root.join("Dockerfile").exists() {
            let content = STATIC_DOCKERFILE.as_bytes();
            let mut header = tar::Header::new_gnu();
            header.set_path("Dockerfile")?;
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append(&header, content)
                .map_err(|e| BackendError::Io(format!("Failed to add Dockerfile: {}", e)))?;
        }

        builder
            .into_inner()
            .map_err(|e| BackendError::Io(format!("Failed to finish build context: {}", e)))
    }

    async fn build_image(&self, tag: &str, context: Vec<u8>) -> Result<(), String> {
        let options = BuildImageOptions::<String> {
            dockerfile: "Dockerfile".to_string(),
            t: tag.to_string(),
            rm: true,
            ..Default::default()
        };

        let mut log = String::new();
        let mut stream = self.docker.build_image(options, None, Some(context.into()));
        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(line) = info.stream {
                        log.push_str(&line);
                    }
                    if let Some(error) = info.error {
                        log.push_str(&error);
                        return Err(log);
                    }
                }
                Err(e) => {
                    log.push_str(&format!("\n{}", e));
                    return Err(log);
                }
            }
        }
        Ok(())
    }

    async fn run_container(&self, name: &str, image: &str) -> Result<String, String> {
        // A previous container for this slug is replaced wholesale; failed
        // attempts do not accumulate.
        let _ = self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;

        let mut port_bindings = HashMap::new();
        port_bindings.insert(
            CONTAINER_PORT.to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: Some("0".to_string()),
            }]),
        );

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            network_mode: self.network_mode.clone(),
            ..Default::default()
        };

        let mut exposed_ports = HashMap::new();
        exposed_ports.insert(CONTAINER_PORT.to_string(), HashMap::new());

        let config = Config {
            image: Some(image.to_string()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: name.to_string(),
            platform: None,
        };

        self.docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| format!("Failed to create container {}: {}", name, e))?;

        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| format!("Failed to start container {}: {}", name, e))?;

        let inspect = self
            .docker
            .inspect_container(name, None)
            .await
            .map_err(|e| format!("Failed to inspect container {}: {}", name, e))?;

        let host_port = inspect
            .network_settings
            .and_then(|ns| ns.ports)
            .and_then(|ports| ports.get(CONTAINER_PORT).cloned().flatten())
            .and_then(|bindings| bindings.into_iter().next())
            .and_then(|binding| binding.host_port)
            .ok_or_else(|| format!("Container {} has no published port", name))?;

        Ok(format!("http://127.0.0.1:{}", host_port))
    }
}

#[async_trait]
impl DeployBackend for DockerBackend {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn deploy(
        &self,
        app: &Application,
        _environment: Environment,
        artifact: &PreparedArtifact,
    ) -> Result<DeployOutcome, BackendError> {
        let root = deployable_root(app, artifact);
        let tag = format!("{}/{}:{}", self.image_prefix, app.slug, app.version);
        let container_name = format!("autolaunch-{}", app.slug);

        tracing::info!(slug = %app.slug, tag = %tag, "Building container image");
        let context = Self::build_context(&root)?;

        if let Err(log) = self.build_image(&tag, context).await {
            return Ok(DeployOutcome::failed(
                log,
                format!("Image build failed for {}", app.slug),
            ));
        }

        match self.run_container(&container_name, &tag).await {
            Ok(url) => {
                tracing::info!(slug = %app.slug, url = %url, "Container running");
                Ok(DeployOutcome::succeeded(
                    Some(url),
                    format!("Built image {}", tag),
                    format!("Deployed {} as container {}", app.slug, container_name),
                ))
            }
            Err(log) => Ok(DeployOutcome::failed(
                log,
                format!("Container start failed for {}", app.slug),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_build_context_injects_dockerfile() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.html"), b"<html>").unwrap();

        let context = DockerBackend::build_context(temp.path()).unwrap();
        let mut archive = tar::Archive::new(&context[..]);
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.iter().any(|n| n == "Dockerfile"));
        assert!(names.iter().any(|n| n.ends_with("index.html")));
    }

    #[test]
    fn test_build_context_keeps_existing_dockerfile() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("Dockerfile"), b"FROM scratch\n").unwrap();

        let context = DockerBackend::build_context(temp.path()).unwrap();
        let mut archive = tar::Archive::new(&context[..]);
        let mut dockerfiles = 0;
        let mut content = String::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let path = entry.path().unwrap().to_string_lossy().into_owned();
            if path.trim_start_matches("./") == "Dockerfile" {
                dockerfiles += 1;
                entry.read_to_string(&mut content).unwrap();
            }
        }
        assert_eq!(dockerfiles, 1);
        assert_eq!(content, "FROM scratch\n");
    }
}
