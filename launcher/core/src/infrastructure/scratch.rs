// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Scratch Area Primitives
//!
//! Filesystem helpers for artifact assembly: idempotent directory creation,
//! write-with-parents, and the staging directory that gives each run an
//! isolated workspace. A run assembles into a uniquely suffixed staging
//! directory and atomically renames it over the deterministic destination on
//! success, so concurrent runs for the same (kind, slug) never observe
//! partial writes. An unpublished staging directory is removed on drop;
//! published artifacts are retained for auditing.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

/// Idempotent directory creation.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}

/// Write a file, creating parent directories as needed.
pub fn write_file_creating_parents(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Validate a declared relative path and join it under `root`. Rejects
/// absolute paths and parent-directory traversal.
pub fn safe_join(root: &Path, relative: &str) -> io::Result<PathBuf> {
    let rel = Path::new(relative);
    let traversal = rel.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if relative.is_empty() || traversal {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsafe relative path: '{}'", relative),
        ));
    }
    Ok(root.join(rel))
}

/// An exclusively owned staging directory, published by atomic rename.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    destination: PathBuf,
    published: bool,
}

impl StagingDir {
    /// Create a staging directory next to `destination` (same filesystem, so
    /// the final rename is atomic).
    pub fn create(destination: impl Into<PathBuf>) -> io::Result<Self> {
        let destination = destination.into();
        let parent = destination
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?
            .to_path_buf();
        fs::create_dir_all(&parent)?;

        let name = destination
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("artifact");
        let path = parent.join(format!(".stage-{}-{}", name, Uuid::new_v4().simple()));
        fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            destination,
            published: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the destination with the staged tree. The previous artifact
    /// for this (kind, slug) is removed first: every run publishes a fresh
    /// tree, never a merge with stale files.
    pub fn publish(mut self) -> io::Result<PathBuf> {
        if self.destination.exists() {
            fs::remove_dir_all(&self.destination)?;
        }
        fs::rename(&self.path, &self.destination)?;
        self.published = true;
        Ok(self.destination.clone())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if !self.published && self.path.exists() {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                tracing::warn!("Failed to clean up staging directory {:?}: {}", self.path, e);
            }
        }
    }
}
