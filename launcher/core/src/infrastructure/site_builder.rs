// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Website Build Step
//!
//! Implementations of the `SiteBuilder` collaborator. The build step is
//! opaque to the orchestrator: it consumes the `src/` subtree and populates
//! `build/`, or fails with its captured output. `CommandSiteBuilder` runs a
//! configured external command; `PassthroughSiteBuilder` promotes the source
//! tree unchanged for static sites with no build pipeline.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::domain::artifact::{BuildError, SiteBuilder};

/// Runs the configured build command with the source tree as working
/// directory. The build output directory is handed to the command via the
/// `BUILD_DIR` environment variable. A non-zero exit maps to
/// `BuildError::Failed` carrying the combined process output.
pub struct CommandSiteBuilder {
    program: String,
    args: Vec<String>,
}

impl CommandSiteBuilder {
    pub fn new(command: &[String]) -> Result<Self, BuildError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| BuildError::Failed("build command is empty".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

#[async_trait]
impl SiteBuilder for CommandSiteBuilder {
    async fn build(&self, source_dir: &Path, build_dir: &Path) -> Result<(), BuildError> {
        tracing::debug!(program = %self.program, src = %source_dir.display(), "Running site build");

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(source_dir)
            .env("BUILD_DIR", build_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| BuildError::Io(format!("failed to spawn {}: {}", self.program, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let mut logs = String::from_utf8_lossy(&output.stdout).into_owned();
            logs.push_str(&String::from_utf8_lossy(&output.stderr));
            Err(BuildError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                logs.trim()
            )))
        }
    }
}

/// Copies `src/` to `build/` verbatim.
pub struct PassthroughSiteBuilder;

#[async_trait]
impl SiteBuilder for PassthroughSiteBuilder {
    async fn build(&self, source_dir: &Path, build_dir: &Path) -> Result<(), BuildError> {
        let source = source_dir.to_path_buf();
        let build = build_dir.to_path_buf();
        tokio::task::spawn_blocking(move || copy_tree(&source, &build))
            .await
            .map_err(|e| BuildError::Io(e.to_string()))?
    }
}

fn copy_tree(source: &Path, target: &Path) -> Result<(), BuildError> {
    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.map_err(|e| BuildError::Io(e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BuildError::Io(e.to_string()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let dest = target.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)?;
        } else {
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_passthrough_copies_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let build = temp.path().join("build");
        std::fs::create_dir_all(src.join("js")).unwrap();
        std::fs::write(src.join("index.html"), b"<html>").unwrap();
        std::fs::write(src.join("js/app.js"), b"1;").unwrap();
        std::fs::create_dir_all(&build).unwrap();

        PassthroughSiteBuilder.build(&src, &build).await.unwrap();

        assert_eq!(std::fs::read(build.join("index.html")).unwrap(), b"<html>");
        assert_eq!(std::fs::read(build.join("js/app.js")).unwrap(), b"1;");
    }

    #[tokio::test]
    async fn test_command_builder_success() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let build = temp.path().join("build");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&build).unwrap();

        let builder = CommandSiteBuilder::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo built > \"$BUILD_DIR/out.txt\"".to_string(),
        ])
        .unwrap();
        builder.build(&src, &build).await.unwrap();

        assert!(build.join("out.txt").exists());
    }

    #[tokio::test]
    async fn test_command_builder_captures_failure_output() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let build = temp.path().join("build");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir_all(&build).unwrap();

        let builder = CommandSiteBuilder::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo compile error; exit 3".to_string(),
        ])
        .unwrap();
        let err = builder.build(&src, &build).await.unwrap_err();

        match err {
            BuildError::Failed(msg) => {
                assert!(msg.contains("exited with 3"));
                assert!(msg.contains("compile error"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandSiteBuilder::new(&[]).is_err());
    }
}
