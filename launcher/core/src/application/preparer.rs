// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Artifact Preparer
//!
//! Materializes an application into a type-correct file tree on scratch
//! storage and, for package-based kinds, a single compressed archive.
//! Dispatch is over the closed `ArtifactKind` enum: adding a kind means a
//! new builder arm, checked exhaustively by the compiler.
//!
//! Every run assembles into an isolated staging directory and atomically
//! publishes to `<scratch_root>/<kind>/<slug>`, so artifacts are always
//! produced fresh and concurrent runs for the same slug never interleave.
//! File content is fetched through the `ArtifactStore` seam up front; the
//! blocking tree materialization then runs off the async executor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::application::{Application, ArtifactKind, ExtensionManifest, WordPressSupport};
use crate::domain::artifact::{ArtifactStore, PrepareError, PreparedArtifact, SiteBuilder};
use crate::infrastructure::archive;
use crate::infrastructure::scratch::{ensure_dir, safe_join, write_file_creating_parents, StagingDir};

/// Theme screenshots are normalized to this name in the theme root.
const THEME_SCREENSHOT: &str = "screenshot.png";

pub struct ArtifactPreparer {
    store: Arc<dyn ArtifactStore>,
    site_builder: Arc<dyn SiteBuilder>,
    scratch_root: PathBuf,
}

impl ArtifactPreparer {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        site_builder: Arc<dyn SiteBuilder>,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            site_builder,
            scratch_root: scratch_root.into(),
        }
    }

    /// Materialize the application into a prepared artifact.
    pub async fn prepare(&self, app: &Application) -> Result<PreparedArtifact, PrepareError> {
        app.validate_slug().map_err(PrepareError::InvalidSlug)?;

        let files = self.fetch_declared_files(app).await?;
        let screenshot = self.fetch_theme_screenshot(app).await?;

        let destination = self.scratch_root.join(app.kind.as_str()).join(&app.slug);
        let staging = StagingDir::create(&destination)?;

        tracing::debug!(
            slug = %app.slug,
            kind = %app.kind,
            files = files.len(),
            "Assembling artifact tree"
        );

        let staged = staging.path().to_path_buf();
        let app_for_tree = app.clone();
        let package_name = tokio::task::spawn_blocking(move || {
            materialize_tree(&app_for_tree, &staged, &files, screenshot.as_deref())
        })
        .await
        .map_err(|e| PrepareError::Io(format!("materialization task failed: {}", e)))??;

        // The website build step runs against the staged tree, before
        // publication, so a failed build never replaces a previous artifact.
        if app.kind == ArtifactKind::Website {
            let src = staging.path().join("src");
            let build = staging.path().join("build");
            self.site_builder.build(&src, &build).await?;
        }

        let dir = staging.publish()?;
        let package = package_name.map(|name| dir.join(name));

        tracing::info!(slug = %app.slug, kind = %app.kind, dir = %dir.display(), "Artifact prepared");
        Ok(PreparedArtifact { dir, package })
    }

    async fn fetch_declared_files(
        &self,
        app: &Application,
    ) -> Result<Vec<(String, Vec<u8>)>, PrepareError> {
        let mut files = Vec::new();
        for path in app.declared_paths() {
            let content = self.store.get_file_content(app.id, path).await?;
            files.push((path.to_string(), content));
        }
        Ok(files)
    }

    /// Themes may declare a screenshot outside their file map; it is fetched
    /// separately and written as `screenshot.png` unless a declared file
    /// already occupies that name.
    async fn fetch_theme_screenshot(&self, app: &Application) -> Result<Option<Vec<u8>>, PrepareError> {
        if app.kind != ArtifactKind::WordpressTheme {
            return Ok(None);
        }
        let Some(path) = app.wordpress.as_ref().and_then(|wp| wp.screenshot.as_deref()) else {
            return Ok(None);
        };
        if app.declared_paths().any(|p| p == THEME_SCREENSHOT) {
            return Ok(None);
        }
        let content = self.store.get_file_content(app.id, path).await?;
        Ok(Some(content))
    }
}

/// Build the kind-specific tree inside the staging directory. Returns the
/// staging-relative package name for archive-producing kinds.
fn materialize_tree(
    app: &Application,
    staging: &Path,
    files: &[(String, Vec<u8>)],
    screenshot: Option<&[u8]>,
) -> Result<Option<String>, PrepareError> {
    match app.kind {
        ArtifactKind::Website => {
            let src = staging.join("src");
            ensure_dir(&src)?;
            ensure_dir(&staging.join("build"))?;
            write_declared_files(&src, files)?;
            Ok(None)
        }
        ArtifactKind::WordpressTheme => {
            let wp = app.wordpress.clone().unwrap_or_default();
            let component = staging.join(&app.slug);
            ensure_dir(&component)?;

            write_file_creating_parents(
                &component.join("style.css"),
                theme_style_header(app, &wp).as_bytes(),
            )?;
            write_declared_files(&component, files)?;

            if let Some(content) = screenshot {
                let target = component.join(THEME_SCREENSHOT);
                if !target.exists() {
                    write_file_creating_parents(&target, content)?;
                }
            }

            let package = format!("{}.zip", app.slug);
            archive::zip_directory(&component, &staging.join(&package))
                .map_err(|e| PrepareError::Archive(e.to_string()))?;
            Ok(Some(package))
        }
        ArtifactKind::WordpressPlugin => {
            let wp = app.wordpress.clone().unwrap_or_default();
            let component = staging.join(&app.slug);
            ensure_dir(&component)?;

            write_file_creating_parents(
                &component.join(format!("{}.php", app.slug)),
                plugin_main_file(app, &wp).as_bytes(),
            )?;
            write_file_creating_parents(
                &component.join("readme.txt"),
                plugin_readme(app, &wp).as_bytes(),
            )?;
            for dir in ["admin", "includes", "public", "languages"] {
                ensure_dir(&component.join(dir))?;
            }
            write_declared_files(&component, files)?;

            let package = format!("{}.zip", app.slug);
            archive::zip_directory(&component, &staging.join(&package))
                .map_err(|e| PrepareError::Archive(e.to_string()))?;
            Ok(Some(package))
        }
        ArtifactKind::BrowserExtension => {
            let component = staging.join(&app.slug);
            ensure_dir(&component)?;

            let manifest = ExtensionManifest::from_application(app);
            let rendered = serde_json::to_vec_pretty(&manifest)
                .map_err(|e| PrepareError::Io(e.to_string()))?;
            write_file_creating_parents(&component.join("manifest.json"), &rendered)?;
            write_declared_files(&component, files)?;
            // No archive at this stage; store packaging is backend-specific.
            Ok(None)
        }
        ArtifactKind::MobileApp => {
            ensure_dir(staging)?;
            write_declared_files(staging, files)?;
            Ok(None)
        }
    }
}

fn write_declared_files(root: &Path, files: &[(String, Vec<u8>)]) -> Result<(), PrepareError> {
    for (rel, content) in files {
        let target = safe_join(root, rel)?;
        write_file_creating_parents(&target, content)?;
    }
    Ok(())
}

/// The `style.css` theme header. Field order is fixed and load-bearing:
/// WordPress parses these lines positionally tolerant but the studio's
/// round-trip tooling expects this exact sequence.
fn theme_style_header(app: &Application, wp: &WordPressSupport) -> String {
    format!(
        "/*\n\
         Theme Name: {name}\n\
         Theme URI: {uri}\n\
         Author: {author}\n\
         Author URI: {author_uri}\n\
         Description: {description}\n\
         Version: {version}\n\
         Requires at least: {requires}\n\
         Tested up to: {tested}\n\
         Requires PHP: {requires_php}\n\
         License: GNU General Public License v2 or later\n\
         License URI: http://www.gnu.org/licenses/gpl-2.0.html\n\
         Text Domain: {slug}\n\
         */\n",
        name = app.name,
        uri = app.preview_url.as_deref().unwrap_or(""),
        author = app.author_name(),
        author_uri = app.author_url(),
        description = app.description,
        version = app.version,
        requires = wp.requires,
        tested = wp.tested,
        requires_php = wp.requires_php,
        slug = app.slug,
    )
}

/// The main plugin file: header block, guard, constants, and bootstrap.
fn plugin_main_file(app: &Application, _wp: &WordPressSupport) -> String {
    let snake = app.slug.replace('-', "_");
    let constant = snake.to_uppercase();
    let class = snake
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("_");

    format!(
        "<?php\n\
         /*\n\
         Plugin Name: {name}\n\
         Plugin URI: {uri}\n\
         Description: {description}\n\
         Version: {version}\n\
         Author: {author}\n\
         Author URI: {author_uri}\n\
         License: GPL2\n\
         License URI: https://www.gnu.org/licenses/gpl-2.0.html\n\
         Text Domain: {slug}\n\
         Domain Path: /languages\n\
         */\n\
         \n\
         // If this file is called directly, abort.\n\
         if (!defined('WPINC')) {{\n\
         \x20   die;\n\
         }}\n\
         \n\
         define('{constant}_VERSION', '{version}');\n\
         define('{constant}_PLUGIN_DIR', plugin_dir_path(__FILE__));\n\
         define('{constant}_PLUGIN_URL', plugin_dir_url(__FILE__));\n\
         \n\
         // Include the core plugin class\n\
         require plugin_dir_path(__FILE__) . 'includes/class-{slug}.php';\n\
         \n\
         /**\n\
         \x20* Begins execution of the plugin.\n\
         \x20*/\n\
         function run_{snake}() {{\n\
         \x20   $plugin = new {class}();\n\
         \x20   $plugin->run();\n\
         }}\n\
         run_{snake}();\n",
        name = app.name,
        uri = app.preview_url.as_deref().unwrap_or(""),
        description = app.description,
        version = app.version,
        author = app.author_name(),
        author_uri = app.author_url(),
        slug = app.slug,
        snake = snake,
        constant = constant,
        class = class,
    )
}

/// The WordPress.org style readme.txt for plugins.
fn plugin_readme(app: &Application, wp: &WordPressSupport) -> String {
    let contributors = app
        .author_name()
        .to_lowercase()
        .split_whitespace()
        .collect::<String>();
    let tags = wp.category.as_deref().unwrap_or("plugin");

    format!(
        "=== {name} ===\n\
         Contributors: {contributors}\n\
         Tags: {tags}\n\
         Requires at least: {requires}\n\
         Tested up to: {tested}\n\
         Requires PHP: {requires_php}\n\
         Stable tag: {version}\n\
         License: GPLv2 or later\n\
         License URI: https://www.gnu.org/licenses/gpl-2.0.html\n\
         \n\
         {description}\n\
         \n\
         == Description ==\n\
         \n\
         {description}\n\
         \n\
         == Installation ==\n\
         \n\
         1. Upload the plugin files to the `/wp-content/plugins/{slug}` directory, or install the plugin through the WordPress plugins screen directly.\n\
         2. Activate the plugin through the 'Plugins' screen in WordPress\n\
         3. Configure the plugin settings\n\
         \n\
         == Frequently Asked Questions ==\n\
         \n\
         = Is this plugin free? =\n\
         \n\
         Yes, this plugin is completely free to use.\n\
         \n\
         == Changelog ==\n\
         \n\
         = {version} =\n\
         * Initial release\n",
        name = app.name,
        contributors = contributors,
        tags = tags,
        requires = wp.requires,
        tested = wp.tested,
        requires_php = wp.requires_php,
        version = app.version,
        description = app.description,
        slug = app.slug,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{
        ApplicationId, AuthorInfo, ExtensionSpec, FileCategory, MobileSpec,
    };
    use crate::domain::artifact::{BuildError, StoreError};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use tempfile::TempDir;

    struct MapStore {
        files: HashMap<String, Vec<u8>>,
    }

    impl MapStore {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                files: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl ArtifactStore for MapStore {
        async fn get_file_content(
            &self,
            _application_id: ApplicationId,
            relative_path: &str,
        ) -> Result<Vec<u8>, StoreError> {
            self.files
                .get(relative_path)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(relative_path.to_string()))
        }
    }

    /// Copies `src/` to `build/`: stands in for the external build step.
    struct CopyBuilder;

    #[async_trait]
    impl SiteBuilder for CopyBuilder {
        async fn build(&self, source_dir: &Path, build_dir: &Path) -> Result<(), BuildError> {
            for entry in walkdir::WalkDir::new(source_dir) {
                let entry = entry.map_err(|e| BuildError::Io(e.to_string()))?;
                let rel = entry.path().strip_prefix(source_dir).unwrap();
                if rel.as_os_str().is_empty() {
                    continue;
                }
                let target = build_dir.join(rel);
                if entry.file_type().is_dir() {
                    std::fs::create_dir_all(&target)?;
                } else {
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::copy(entry.path(), &target)?;
                }
            }
            Ok(())
        }
    }

    struct FailingBuilder;

    #[async_trait]
    impl SiteBuilder for FailingBuilder {
        async fn build(&self, _source_dir: &Path, _build_dir: &Path) -> Result<(), BuildError> {
            Err(BuildError::Failed("webpack exited with code 1".to_string()))
        }
    }

    fn base_app(kind: ArtifactKind, slug: &str) -> Application {
        Application {
            id: ApplicationId::new(),
            kind,
            name: "Acme Tools".to_string(),
            slug: slug.to_string(),
            version: "2.1.0".to_string(),
            description: "Handy tools from Acme".to_string(),
            author: Some(AuthorInfo {
                name: "Jane Dev".to_string(),
                email: None,
                url: Some("https://jane.dev".to_string()),
            }),
            approved: false,
            preview_url: Some("https://preview.example.com/acme".to_string()),
            files: BTreeMap::new(),
            wordpress: None,
            extension: None,
            mobile: None,
        }
    }

    fn preparer(store: MapStore, scratch: &Path) -> ArtifactPreparer {
        ArtifactPreparer::new(Arc::new(store), Arc::new(CopyBuilder), scratch)
    }

    fn header_field(text: &str, field: &str) -> Option<String> {
        text.lines().find_map(|line| {
            line.trim()
                .strip_prefix(&format!("{}:", field))
                .map(|v| v.trim().to_string())
        })
    }

    #[tokio::test]
    async fn test_prepare_website_separates_src_and_build() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::Website, "demo");
        app.files
            .insert(FileCategory::Js, vec!["index.js".to_string()]);
        app.files
            .insert(FileCategory::Html, vec!["pages/index.html".to_string()]);

        let store = MapStore::new(&[
            ("index.js", "console.log('hi');"),
            ("pages/index.html", "<html></html>"),
        ]);
        let artifact = preparer(store, temp.path()).prepare(&app).await.unwrap();

        assert_eq!(artifact.dir, temp.path().join("website").join("demo"));
        assert!(artifact.package.is_none());
        assert!(artifact.dir.join("src/index.js").exists());
        assert!(artifact.dir.join("src/pages/index.html").exists());
        // CopyBuilder populated the build subtree from src.
        assert!(artifact.dir.join("build/index.js").exists());
    }

    #[tokio::test]
    async fn test_failed_site_build_aborts_without_publishing() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::Website, "demo");
        app.files
            .insert(FileCategory::Js, vec!["index.js".to_string()]);

        let store = MapStore::new(&[("index.js", "x")]);
        let preparer =
            ArtifactPreparer::new(Arc::new(store), Arc::new(FailingBuilder), temp.path());

        let err = preparer.prepare(&app).await.unwrap_err();
        assert!(matches!(err, PrepareError::Build(_)));
        assert!(!temp.path().join("website").join("demo").exists());
    }

    #[tokio::test]
    async fn test_prepare_theme_synthesizes_header_and_package() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::WordpressTheme, "acme-theme");
        app.files
            .insert(FileCategory::Php, vec!["index.php".to_string()]);
        app.wordpress = Some(WordPressSupport {
            requires: "5.8".to_string(),
            tested: "6.5".to_string(),
            requires_php: "7.4".to_string(),
            category: None,
            screenshot: Some("shots/main.png".to_string()),
        });

        let store = MapStore::new(&[("index.php", "<?php // index"), ("shots/main.png", "PNG")]);
        let artifact = preparer(store, temp.path()).prepare(&app).await.unwrap();

        let component = artifact.dir.join("acme-theme");
        let style = std::fs::read_to_string(component.join("style.css")).unwrap();

        // Round-trip: the generated header parses back to the same metadata.
        assert_eq!(header_field(&style, "Theme Name").as_deref(), Some("Acme Tools"));
        assert_eq!(header_field(&style, "Version").as_deref(), Some("2.1.0"));
        assert_eq!(header_field(&style, "Requires at least").as_deref(), Some("5.8"));
        assert_eq!(header_field(&style, "Tested up to").as_deref(), Some("6.5"));
        assert_eq!(header_field(&style, "Requires PHP").as_deref(), Some("7.4"));
        assert_eq!(header_field(&style, "Text Domain").as_deref(), Some("acme-theme"));

        assert!(component.join("index.php").exists());
        assert!(component.join("screenshot.png").exists());

        // Exactly one archive, containing every prepared file once.
        let package = artifact.package.clone().unwrap();
        assert_eq!(package, artifact.dir.join("acme-theme.zip"));
        let mut archive =
            zip::ZipArchive::new(std::fs::File::open(&package).unwrap()).unwrap();
        let mut file_entries = std::collections::BTreeSet::new();
        for i in 0..archive.len() {
            let entry = archive.by_index(i).unwrap();
            if !entry.is_dir() {
                file_entries.insert(entry.name().to_string());
            }
        }
        let expected: std::collections::BTreeSet<String> = [
            "acme-theme/style.css",
            "acme-theme/index.php",
            "acme-theme/screenshot.png",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(file_entries, expected);
    }

    #[tokio::test]
    async fn test_prepare_plugin_scaffold_and_headers() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::WordpressPlugin, "acme-tools");
        app.files.insert(
            FileCategory::Php,
            vec!["includes/class-acme-tools.php".to_string()],
        );
        app.wordpress = Some(WordPressSupport {
            category: Some("productivity".to_string()),
            ..Default::default()
        });

        let store = MapStore::new(&[("includes/class-acme-tools.php", "<?php class Acme_Tools {}")]);
        let artifact = preparer(store, temp.path()).prepare(&app).await.unwrap();

        let component = artifact.dir.join("acme-tools");
        for dir in ["admin", "includes", "public", "languages"] {
            assert!(component.join(dir).is_dir(), "missing scaffold dir {}", dir);
        }

        let main = std::fs::read_to_string(component.join("acme-tools.php")).unwrap();
        assert!(main.starts_with("<?php"));
        assert_eq!(header_field(&main, "Plugin Name").as_deref(), Some("Acme Tools"));
        assert_eq!(header_field(&main, "Version").as_deref(), Some("2.1.0"));
        assert!(main.contains("define('ACME_TOOLS_VERSION', '2.1.0');"));
        assert!(main.contains("function run_acme_tools()"));
        assert!(main.contains("new Acme_Tools()"));

        let readme = std::fs::read_to_string(component.join("readme.txt")).unwrap();
        assert!(readme.starts_with("=== Acme Tools ==="));
        assert_eq!(header_field(&readme, "Contributors").as_deref(), Some("janedev"));
        assert_eq!(header_field(&readme, "Tags").as_deref(), Some("productivity"));
        assert_eq!(header_field(&readme, "Stable tag").as_deref(), Some("2.1.0"));

        assert!(artifact.package.is_some());
    }

    #[tokio::test]
    async fn test_prepare_extension_serializes_manifest_without_archive() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::BrowserExtension, "acme-ext");
        app.files
            .insert(FileCategory::Js, vec!["popup.js".to_string()]);
        app.extension = Some(ExtensionSpec {
            manifest_version: 3,
            permissions: vec!["storage".to_string(), "tabs".to_string()],
            host_permissions: vec!["https://*.example.com/*".to_string()],
            ..Default::default()
        });

        let store = MapStore::new(&[("popup.js", "void 0;")]);
        let artifact = preparer(store, temp.path()).prepare(&app).await.unwrap();

        assert!(artifact.package.is_none());
        let component = artifact.dir.join("acme-ext");
        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(component.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest["manifest_version"], 3);
        assert_eq!(manifest["name"], "Acme Tools");
        assert_eq!(manifest["permissions"][1], "tabs");
        assert_eq!(manifest["host_permissions"][0], "https://*.example.com/*");
        assert!(component.join("popup.js").exists());
    }

    #[tokio::test]
    async fn test_prepare_mobile_writes_declared_files_only() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::MobileApp, "acme-mobile");
        app.mobile = Some(MobileSpec::default());
        app.files
            .insert(FileCategory::Js, vec!["App.js".to_string()]);
        app.files
            .insert(FileCategory::Other, vec!["app.json".to_string()]);

        let store = MapStore::new(&[("App.js", "export default 1;"), ("app.json", "{}")]);
        let artifact = preparer(store, temp.path()).prepare(&app).await.unwrap();

        assert!(artifact.package.is_none());
        assert!(artifact.dir.join("App.js").exists());
        assert!(artifact.dir.join("app.json").exists());
        // Exactly the declared files: no synthesized extras for this kind.
        let entries: Vec<_> = std::fs::read_dir(&artifact.dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_source_file_fails_prepare() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::Website, "demo");
        app.files
            .insert(FileCategory::Js, vec!["missing.js".to_string()]);

        let store = MapStore::new(&[]);
        let err = preparer(store, temp.path()).prepare(&app).await.unwrap_err();
        assert!(matches!(err, PrepareError::Store(StoreError::NotFound(_))));
        assert!(!temp.path().join("website").join("demo").exists());
    }

    #[tokio::test]
    async fn test_prepare_replaces_previous_artifact() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::MobileApp, "acme-mobile");
        app.files
            .insert(FileCategory::Js, vec!["App.js".to_string()]);

        let first = preparer(MapStore::new(&[("App.js", "v1")]), temp.path())
            .prepare(&app)
            .await
            .unwrap();
        std::fs::write(first.dir.join("stale.txt"), b"left behind").unwrap();

        let second = preparer(MapStore::new(&[("App.js", "v2")]), temp.path())
            .prepare(&app)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(second.dir.join("App.js")).unwrap(), "v2");
        // Fresh tree per run: nothing leaks from the previous deployment.
        assert!(!second.dir.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn test_prepare_rejects_traversal_paths() {
        let temp = TempDir::new().unwrap();
        let mut app = base_app(ArtifactKind::Website, "demo");
        app.files
            .insert(FileCategory::Other, vec!["../escape.txt".to_string()]);

        let store = MapStore::new(&[("../escape.txt", "nope")]);
        let err = preparer(store, temp.path()).prepare(&app).await.unwrap_err();
        assert!(matches!(err, PrepareError::Io(_)));
    }
}
