// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Artifact Seams
//!
//! Trait boundaries between the preparer and its external collaborators: the
//! artifact store that owns raw file content, and the website build step that
//! turns a source tree into a deployable tree. Both are implemented in
//! `crate::infrastructure`; tests substitute in-memory fakes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::application::ApplicationId;

/// Output of the preparer: a fully rendered file tree on scratch storage,
/// plus the single compressed package for kinds that require one. Owned
/// exclusively by the orchestration run that created it: never shared
/// across concurrent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedArtifact {
    /// Absolute path of the artifact root on scratch storage.
    pub dir: PathBuf,

    /// Single archive of the component tree (theme/plugin kinds).
    pub package: Option<PathBuf>,
}

impl PreparedArtifact {
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            package: None,
        }
    }

    pub fn packaged(dir: impl Into<PathBuf>, package: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            package: Some(package.into()),
        }
    }
}

/// Read access to the raw file content of an application.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Fetch the content stored for `relative_path` on the given application.
    async fn get_file_content(
        &self,
        application_id: ApplicationId,
        relative_path: &str,
    ) -> Result<Vec<u8>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// External build step for the website kind. Consumes the `src/` subtree and
/// populates the `build/` subtree, or fails with captured diagnostics.
#[async_trait]
pub trait SiteBuilder: Send + Sync {
    async fn build(&self, source_dir: &Path, build_dir: &Path) -> Result<(), BuildError>;
}

#[derive(Debug, Error)]
pub enum BuildError {
    /// The build command ran and reported failure; the payload carries its
    /// captured output.
    #[error("Site build failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io(err.to_string())
    }
}

/// Failures raised while materializing an artifact. Any of these aborts the
/// run and transitions the deployment record to `failed`.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Invalid application slug: {0}")]
    InvalidSlug(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PrepareError {
    fn from(err: std::io::Error) -> Self {
        PrepareError::Io(err.to_string())
    }
}
