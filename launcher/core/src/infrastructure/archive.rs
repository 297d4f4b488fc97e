// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Archive Packaging
//!
//! Produces the single compressed package for archive-based artifact kinds.
//! Entries preserve relative paths under a top-level directory named after
//! the packaged tree (the layout WordPress expects when unzipping a theme or
//! plugin), are visited in sorted order, and contain every input file exactly
//! once.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Zip error: {0}")]
    Zip(String),
}

impl From<io::Error> for ArchiveError {
    fn from(err: io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::Zip(err.to_string())
    }
}

/// Zip `src_dir` into `dest`, rooting every entry under `src_dir`'s own
/// directory name. Returns the number of file entries written.
pub fn zip_directory(src_dir: &Path, dest: &Path) -> Result<usize, ArchiveError> {
    let root_name = src_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ArchiveError::Io("source directory has no name".to_string()))?
        .to_string();

    let file = File::create(dest)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut entries: Vec<_> = WalkDir::new(src_dir)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ArchiveError::Io(e.to_string()))?;
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut count = 0usize;
    let mut buffer = Vec::new();
    for entry in entries {
        let path = entry.path();
        let rel = path
            .strip_prefix(src_dir)
            .map_err(|e| ArchiveError::Io(e.to_string()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let name = format!("{}/{}", root_name, rel.to_string_lossy().replace('\\', "/"));

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            buffer.clear();
            File::open(path)?.read_to_end(&mut buffer)?;
            writer.write_all(&buffer)?;
            count += 1;
        }
    }

    writer.finish()?;
    Ok(count)
}

/// Zip a directory tree into memory, entries relative to `src_dir` without a
/// top-level wrapper. Used by backends that upload deployable trees as a
/// single request body.
pub fn zip_directory_to_vec(src_dir: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut buf = Vec::new();
    {
        let cursor = io::Cursor::new(&mut buf);
        let mut writer = zip::ZipWriter::new(cursor);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let mut entries: Vec<_> = WalkDir::new(src_dir)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ArchiveError::Io(e.to_string()))?;
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        let mut content = Vec::new();
        for entry in entries {
            let path = entry.path();
            let rel = path
                .strip_prefix(src_dir)
                .map_err(|e| ArchiveError::Io(e.to_string()))?;
            if rel.as_os_str().is_empty() || entry.file_type().is_dir() {
                continue;
            }
            let name = rel.to_string_lossy().replace('\\', "/");
            writer.start_file(name, options)?;
            content.clear();
            File::open(path)?.read_to_end(&mut content)?;
            writer.write_all(&content)?;
        }
        writer.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scratch::write_file_creating_parents;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_zip_directory_contains_every_file_once() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("my-theme");
        write_file_creating_parents(&src.join("style.css"), b"/* theme */").unwrap();
        write_file_creating_parents(&src.join("assets/app.js"), b"console.log(1);").unwrap();
        write_file_creating_parents(&src.join("assets/site.css"), b"body{}").unwrap();

        let dest = temp.path().join("my-theme.zip");
        let count = zip_directory(&src, &dest).unwrap();
        assert_eq!(count, 3);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut names = BTreeSet::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            if !entry.is_dir() {
                names.insert(entry.name().to_string());
            }
        }
        let expected: BTreeSet<String> = [
            "my-theme/style.css",
            "my-theme/assets/app.js",
            "my-theme/assets/site.css",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_zip_roundtrip_preserves_content() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("pkg");
        write_file_creating_parents(&src.join("readme.txt"), b"=== Pkg ===").unwrap();

        let dest = temp.path().join("pkg.zip");
        zip_directory(&src, &dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut entry = archive.by_name("pkg/readme.txt").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "=== Pkg ===");
    }

    #[test]
    fn test_zip_to_vec_has_no_wrapper_directory() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("site");
        write_file_creating_parents(&src.join("index.html"), b"<html></html>").unwrap();
        write_file_creating_parents(&src.join("js/app.js"), b"x").unwrap();

        let bytes = zip_directory_to_vec(&src).unwrap();
        let mut archive = zip::ZipArchive::new(io::Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("index.html").is_ok());
        assert!(archive.by_name("js/app.js").is_ok());
    }
}
