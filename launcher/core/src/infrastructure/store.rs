// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Filesystem Artifact Store
//!
//! Filesystem-backed implementation of `ArtifactStore` for single-node
//! deployments: each application's raw files live under
//! `<root>/<application-id>/<relative-path>`. Declared paths are validated
//! against parent-directory traversal before resolution.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use crate::domain::application::ApplicationId;
use crate::domain::artifact::{ArtifactStore, StoreError};

pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, application_id: ApplicationId, relative_path: &str) -> Result<PathBuf, StoreError> {
        let rel = Path::new(relative_path);
        let traversal = rel.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if relative_path.is_empty() || traversal {
            return Err(StoreError::InvalidPath(relative_path.to_string()));
        }
        Ok(self.root.join(application_id.to_string()).join(rel))
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn get_file_content(
        &self,
        application_id: ApplicationId,
        relative_path: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(application_id, relative_path)?;
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(relative_path.to_string()))
            }
            Err(e) => Err(StoreError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_file_under_application_root() {
        let temp = TempDir::new().unwrap();
        let store = FsArtifactStore::new(temp.path());
        let app_id = ApplicationId::new();

        let dir = temp.path().join(app_id.to_string()).join("css");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("site.css"), b"body{}").unwrap();

        let content = store.get_file_content(app_id, "css/site.css").await.unwrap();
        assert_eq!(content, b"body{}");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = FsArtifactStore::new(temp.path());

        let err = store
            .get_file_content(ApplicationId::new(), "nope.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("secret.txt"), b"top").unwrap();
        let store = FsArtifactStore::new(temp.path().join("apps"));

        let err = store
            .get_file_content(ApplicationId::new(), "../secret.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
