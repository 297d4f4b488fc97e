// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Application Aggregate
//!
//! Read-only input to the orchestrator: one logical artifact assembled in the
//! studio, tagged with one of the five supported kinds. The kind is immutable
//! once set; the slug is unique and URL-safe and doubles as the scratch
//! directory name, the WordPress text domain, and the container name stem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The five supported artifact kinds. A closed set: adding a kind means a new
/// variant and a new preparer arm, checked exhaustively by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Website,
    WordpressTheme,
    WordpressPlugin,
    BrowserExtension,
    MobileApp,
}

impl ArtifactKind {
    /// Wire/directory tag, stable across the config file, the scratch layout,
    /// and persisted records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Website => "website",
            ArtifactKind::WordpressTheme => "wordpress-theme",
            ArtifactKind::WordpressPlugin => "wordpress-plugin",
            ArtifactKind::BrowserExtension => "browser-extension",
            ArtifactKind::MobileApp => "mobile-app",
        }
    }

    /// Kinds whose prepared artifact is a single compressed package.
    pub fn is_packaged(&self) -> bool {
        matches!(
            self,
            ArtifactKind::WordpressTheme | ArtifactKind::WordpressPlugin
        )
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File categories an application declares its files under. The category only
/// groups paths for the studio UI; the preparer writes every declared path
/// relative to the artifact root regardless of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Html,
    Js,
    Css,
    Php,
    Images,
    Fonts,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// WordPress compatibility metadata carried by theme and plugin kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressSupport {
    /// Minimum WordPress version ("Requires at least").
    #[serde(default = "default_requires")]
    pub requires: String,

    /// Last WordPress version the artifact was verified against.
    #[serde(default = "default_tested")]
    pub tested: String,

    /// Minimum PHP version.
    #[serde(default = "default_requires_php")]
    pub requires_php: String,

    /// Directory tag for readme.txt (plugins only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Relative path of a screenshot to copy into the theme root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl Default for WordPressSupport {
    fn default() -> Self {
        Self {
            requires: default_requires(),
            tested: default_tested(),
            requires_php: default_requires_php(),
            category: None,
            screenshot: None,
        }
    }
}

/// Structured manifest configuration for the browser-extension kind. The
/// preparer serializes this directly into `manifest.json`: no templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionSpec {
    /// Manifest schema version (2 or 3).
    #[serde(default = "default_manifest_version")]
    pub manifest_version: u8,

    /// Icon size → relative path.
    #[serde(default)]
    pub icons: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundSpec>,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default)]
    pub host_permissions: Vec<String>,

    #[serde(default)]
    pub content_scripts: Vec<ContentScriptSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_page: Option<String>,

    #[serde(default)]
    pub web_accessible_resources: Vec<WebAccessibleResourceSpec>,
}

impl Default for ExtensionSpec {
    fn default() -> Self {
        Self {
            manifest_version: default_manifest_version(),
            icons: BTreeMap::new(),
            action: None,
            background: None,
            permissions: Vec::new(),
            host_permissions: Vec::new(),
            content_scripts: Vec::new(),
            options_page: None,
            web_accessible_resources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(default)]
    pub default_icon: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_popup: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackgroundSpec {
    /// MV3 service worker entry point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<String>,

    /// MV2 background scripts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentScriptSpec {
    pub matches: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub js: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebAccessibleResourceSpec {
    pub resources: Vec<String>,
    pub matches: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MobilePlatform {
    Ios,
    Android,
    Pwa,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MobileSpec {
    #[serde(default)]
    pub platforms: Vec<MobilePlatform>,
}

/// One logical artifact record as handed to `launch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub kind: ArtifactKind,
    pub name: String,
    pub slug: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorInfo>,
    /// Production launches require this when the approval policy is enabled.
    #[serde(default)]
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,

    /// Category → ordered relative paths, fetched from the artifact store.
    #[serde(default)]
    pub files: BTreeMap<FileCategory, Vec<String>>,

    /// Kind-specific metadata. Only the section matching `kind` is consulted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordpress: Option<WordPressSupport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<MobileSpec>,
}

impl Application {
    /// Every declared relative path, category order preserved.
    pub fn declared_paths(&self) -> impl Iterator<Item = &str> {
        self.files.values().flatten().map(String::as_str)
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("AutoLaunch Studio")
    }

    pub fn author_url(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|a| a.url.as_deref())
            .unwrap_or("")
    }

    /// Slugs name scratch directories, zip entries, and container names, so
    /// they are restricted to lowercase alphanumerics and single dashes.
    pub fn validate_slug(&self) -> Result<(), String> {
        if self.slug.is_empty() {
            return Err("slug cannot be empty".to_string());
        }
        let ok = self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !self.slug.starts_with('-')
            && !self.slug.ends_with('-')
            && !self.slug.contains("--");
        if ok {
            Ok(())
        } else {
            Err(format!("slug '{}' is not URL-safe", self.slug))
        }
    }
}

/// The `manifest.json` document synthesized for browser extensions. Field set
/// and names follow the WebExtension manifest schema; optional sections are
/// omitted from the output entirely rather than serialized as null.
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionManifest {
    pub manifest_version: u8,
    pub name: String,
    pub version: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub icons: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ManifestAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<ManifestBackground>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host_permissions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content_scripts: Vec<ManifestContentScript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_page: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub web_accessible_resources: Vec<WebAccessibleResourceSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestAction {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub default_icon: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_popup: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestBackground {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestContentScript {
    pub matches: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub js: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub css: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_at: Option<String>,
}

impl ExtensionManifest {
    /// Direct mapping from the application's structured configuration.
    pub fn from_application(app: &Application) -> Self {
        let spec = app.extension.clone().unwrap_or_default();
        Self {
            manifest_version: spec.manifest_version,
            name: app.name.clone(),
            version: app.version.clone(),
            description: app.description.clone(),
            author: app.author.as_ref().map(|a| a.name.clone()),
            icons: spec.icons,
            action: spec.action.map(|a| ManifestAction {
                default_icon: a.default_icon,
                default_title: a.default_title,
                default_popup: a.default_popup,
            }),
            background: spec.background.map(|b| ManifestBackground {
                service_worker: b.service_worker,
                scripts: b.scripts,
            }),
            permissions: spec.permissions,
            host_permissions: spec.host_permissions,
            content_scripts: spec
                .content_scripts
                .into_iter()
                .map(|cs| ManifestContentScript {
                    matches: cs.matches,
                    js: cs.js,
                    css: cs.css,
                    run_at: cs.run_at,
                })
                .collect(),
            options_page: spec.options_page,
            web_accessible_resources: spec.web_accessible_resources,
        }
    }
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_requires() -> String {
    "5.0".to_string()
}

fn default_tested() -> String {
    "6.4".to_string()
}

fn default_requires_php() -> String {
    "7.0".to_string()
}

fn default_manifest_version() -> u8 {
    3
}
