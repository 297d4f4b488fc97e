// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! GitHub Deployment Backend
//!
//! Source-control-triggered deployment: commits the deployable tree and
//! pushes it to the configured remote/branch. The actual rollout is driven
//! by whatever watches that branch (Pages, an Actions workflow); this
//! backend's contract ends at an accepted push. The returned URL is the
//! configured public URL, falling back to the GitHub Pages address derived
//! from the remote.

use async_trait::async_trait;
use git2::{Cred, IndexAddOption, PushOptions, RemoteCallbacks, Repository, Signature};
use std::path::{Path, PathBuf};

use crate::domain::application::Application;
use crate::domain::artifact::PreparedArtifact;
use crate::domain::backend::{BackendError, DeployBackend, DeployOutcome};
use crate::domain::config::{resolve_secret, GithubTarget};
use crate::domain::deployment::Environment;

use super::deployable_root;

pub struct GithubBackend {
    target: GithubTarget,
}

impl GithubBackend {
    pub fn new(target: GithubTarget) -> Self {
        Self { target }
    }

    /// Derive the GitHub Pages URL from an https remote, e.g.
    /// `https://github.com/acme/site.git` → `https://acme.github.io/site`.
    fn pages_url(remote: &str) -> Option<String> {
        let rest = remote.strip_prefix("https://github.com/")?;
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let (owner, repo) = rest.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(format!("https://{}.github.io/{}", owner, repo))
    }

    fn public_url(&self) -> Option<String> {
        self.target
            .public_url
            .clone()
            .or_else(|| Self::pages_url(&self.target.remote))
    }
}

/// Commit the tree at `root` and push it. Runs on a blocking thread: git2
/// is synchronous.
fn commit_and_push(
    root: &Path,
    remote_url: &str,
    branch: &str,
    token: Option<String>,
    message: &str,
) -> Result<(), git2::Error> {
    let repo = match Repository::open(root) {
        Ok(repo) => repo,
        Err(_) => Repository::init(root)?,
    };

    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let signature = Signature::now("AutoLaunch Studio", "deploy@autolaunchstudio.com")?;
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

    let mut remote = repo.remote_anonymous(remote_url)?;
    let mut callbacks = RemoteCallbacks::new();
    if let Some(token) = token {
        callbacks.credentials(move |_url, _username, _allowed| {
            Cred::userpass_plaintext("x-access-token", &token)
        });
    }
    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);

    // Force-push: every deployment publishes the freshly prepared tree, not
    // a merge with whatever the branch held before.
    let refspec = format!("+HEAD:refs/heads/{}", branch);
    remote.push(&[refspec.as_str()], Some(&mut options))?;
    Ok(())
}

#[async_trait]
impl DeployBackend for GithubBackend {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn deploy(
        &self,
        app: &Application,
        environment: Environment,
        artifact: &PreparedArtifact,
    ) -> Result<DeployOutcome, BackendError> {
        let root: PathBuf = deployable_root(app, artifact);
        let remote = self.target.remote.clone();
        let branch = self.target.branch.clone();
        let token = self.target.token.as_deref().and_then(resolve_secret);
        let message = format!(
            "Deploy {} {} to {}",
            app.slug, app.version, environment
        );

        tracing::info!(slug = %app.slug, remote = %remote, branch = %branch, "Pushing deployment");

        let push_result = tokio::task::spawn_blocking(move || {
            commit_and_push(&root, &remote, &branch, token, &message)
        })
        .await
        .map_err(|e| BackendError::Io(format!("push task failed: {}", e)))?;

        match push_result {
            Ok(()) => Ok(DeployOutcome::succeeded(
                self.public_url(),
                format!("Pushed {} to {}", app.slug, self.target.branch),
                format!("Deployment of {} triggered via push", app.slug),
            )),
            Err(e) => Ok(DeployOutcome::failed(
                e.to_string(),
                format!("Git push failed for {}", app.slug),
            )),
        }
    }
}
