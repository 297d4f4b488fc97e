// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Deployment Backend Registry
//!
//! Strategy registry for deployment backends: each implementation registers
//! under its method name at startup, and the orchestrator resolves the
//! configured name by straight lookup. An unrecognized name resolves to
//! `None` and surfaces as `UnsupportedDeploymentMethod` on the launch path -
//! deliberately a runtime outcome, since the configured method is free-form
//! and the set of registered backends depends on the node's configuration.

pub mod docker;
pub mod github;
pub mod netlify;
pub mod vercel;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::application::{Application, ArtifactKind};
use crate::domain::artifact::PreparedArtifact;
use crate::domain::backend::DeployBackend;
use crate::domain::config::LaunchConfig;

pub use docker::DockerBackend;
pub use github::GithubBackend;
pub use netlify::NetlifyBackend;
pub use vercel::VercelBackend;

#[derive(Default)]
pub struct BackendRegistry {
    backends: HashMap<String, Arc<dyn DeployBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Arc<dyn DeployBackend>) {
        self.backends.insert(backend.name().to_string(), backend);
    }

    pub fn resolve(&self, method: &str) -> Option<Arc<dyn DeployBackend>> {
        self.backends.get(method).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the registry from configuration. Targets that are unconfigured
    /// or fail to initialize are skipped with a warning; resolving them later
    /// yields the unsupported-method outcome.
    pub fn from_config(config: &LaunchConfig) -> Self {
        let mut registry = Self::new();

        match DockerBackend::new(&config.targets.docker) {
            Ok(backend) => registry.register(Arc::new(backend)),
            Err(e) => tracing::warn!("Docker backend not registered: {}", e),
        }

        if let Some(github) = &config.targets.github {
            registry.register(Arc::new(GithubBackend::new(github.clone())));
        }

        if let Some(vercel) = &config.targets.vercel {
            match VercelBackend::new(vercel) {
                Ok(backend) => registry.register(Arc::new(backend)),
                Err(e) => tracing::warn!("Vercel backend not registered: {}", e),
            }
        }

        if let Some(netlify) = &config.targets.netlify {
            match NetlifyBackend::new(netlify) {
                Ok(backend) => registry.register(Arc::new(backend)),
                Err(e) => tracing::warn!("Netlify backend not registered: {}", e),
            }
        }

        registry
    }
}

/// The subtree of a prepared artifact that actually gets deployed: websites
/// serve their `build/` output, component kinds their `<slug>/` directory,
/// and everything else the artifact root.
pub(crate) fn deployable_root(app: &Application, artifact: &PreparedArtifact) -> PathBuf {
    match app.kind {
        ArtifactKind::Website => {
            let build = artifact.dir.join("build");
            if build.is_dir() {
                build
            } else {
                artifact.dir.clone()
            }
        }
        ArtifactKind::WordpressTheme
        | ArtifactKind::WordpressPlugin
        | ArtifactKind::BrowserExtension => {
            let component = artifact.dir.join(&app.slug);
            if component.is_dir() {
                component
            } else {
                artifact.dir.clone()
            }
        }
        ArtifactKind::MobileApp => artifact.dir.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backend::{BackendError, DeployOutcome};
    use crate::domain::deployment::Environment;
    use async_trait::async_trait;

    struct FakeBackend(&'static str);

    #[async_trait]
    impl DeployBackend for FakeBackend {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn deploy(
            &self,
            _app: &Application,
            _environment: Environment,
            _artifact: &PreparedArtifact,
        ) -> Result<DeployOutcome, BackendError> {
            Ok(DeployOutcome::succeeded(None, "", "ok"))
        }
    }

    #[test]
    fn test_resolve_is_straight_lookup() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(FakeBackend("docker")));
        registry.register(Arc::new(FakeBackend("netlify")));

        assert!(registry.resolve("docker").is_some());
        assert!(registry.resolve("netlify").is_some());
        assert!(registry.resolve("heroku").is_none());
        assert_eq!(registry.names(), vec!["docker", "netlify"]);
    }

    #[test]
    fn test_registration_is_last_wins() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(FakeBackend("docker")));
        registry.register(Arc::new(FakeBackend("docker")));
        assert_eq!(registry.names().len(), 1);
    }
}
