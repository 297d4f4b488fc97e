// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Launch Configuration
//
// Immutable configuration snapshot for the orchestrator, constructed once at
// process start and passed into services explicitly: no ambient globals.
// Sources, in precedence order:
// - explicit path handed in by the CLI
// - AUTOLAUNCH_CONFIG_PATH environment variable
// - ./autolaunch.yaml (working directory)
// - ~/.autolaunch/config.yaml (user home)
// - /etc/autolaunch/config.yaml (system)
// followed by environment variable overrides, applied only at load/reload
// boundaries. Running launches keep the snapshot they started with.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::deployment::Environment;

/// Effective orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Global kill switch; a disabled configuration short-circuits every
    /// launch before any side effect.
    #[serde(default = "default_true")]
    pub auto_deploy_enabled: bool,

    /// Environment used when the caller does not pass one.
    #[serde(default = "default_environment")]
    pub default_environment: Environment,

    /// Registry key of the backend driving deployments. Kept as a free-form
    /// string: an unknown name is a runtime policy failure observed per
    /// launch, not a config parse error.
    #[serde(default = "default_method")]
    pub deployment_method: String,

    /// Require `approved` applications for production launches.
    #[serde(default = "default_true")]
    pub require_approval: bool,

    /// Invoke the notifier after each terminal record update.
    #[serde(default = "default_true")]
    pub notify_on_deployment: bool,

    /// Public base URL of the studio, handed to backends that compose URLs.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root of the scratch area artifacts are assembled under.
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,

    /// Webhook endpoint for deployment notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_webhook: Option<String>,

    /// Command invoked to build website artifacts (`src/` → `build/`).
    /// When unset, the source tree is promoted as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_build_command: Option<Vec<String>>,

    /// PostgreSQL connection string; in-memory records when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Per-backend settings.
    #[serde(default)]
    pub targets: TargetSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSettings {
    #[serde(default)]
    pub docker: DockerTarget,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GithubTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vercel: Option<VercelTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub netlify: Option<NetlifyTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerTarget {
    /// Custom daemon socket; auto-detect when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<String>,

    /// Docker network to attach launched containers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    /// Image repository prefix for built artifacts.
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
}

impl Default for DockerTarget {
    fn default() -> Self {
        Self {
            socket_path: None,
            network_mode: None,
            image_prefix: default_image_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubTarget {
    /// Push remote, e.g. "https://github.com/acme/site.git".
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Access token (supports "env:VAR_NAME" indirection).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Public URL serving the pushed tree (e.g. the Pages URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VercelTarget {
    #[serde(default = "default_vercel_api")]
    pub api_base: String,

    /// API token (supports "env:VAR_NAME" indirection).
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetlifyTarget {
    #[serde(default = "default_netlify_api")]
    pub api_base: String,

    /// API token (supports "env:VAR_NAME" indirection).
    pub token: String,

    pub site_id: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            auto_deploy_enabled: true,
            default_environment: Environment::Staging,
            deployment_method: default_method(),
            require_approval: true,
            notify_on_deployment: true,
            base_url: default_base_url(),
            scratch_root: default_scratch_root(),
            notify_webhook: None,
            website_build_command: None,
            database_url: None,
            targets: TargetSettings::default(),
        }
    }
}

impl LaunchConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover the configuration file using the precedence order documented
    /// at the top of this module.
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("AUTOLAUNCH_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./autolaunch.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".autolaunch").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/autolaunch/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to defaults. Environment
    /// overrides are applied in every branch.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides. This allows container
    /// deployments to override stored configuration without editing files.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AUTO_DEPLOY_ENABLED") {
            match parse_bool(&val) {
                Some(v) => {
                    tracing::info!("Environment override: AUTO_DEPLOY_ENABLED={}", v);
                    self.auto_deploy_enabled = v;
                }
                None => tracing::warn!(
                    "Invalid value for AUTO_DEPLOY_ENABLED: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }

        if let Ok(val) = std::env::var("DEFAULT_ENVIRONMENT") {
            match val.parse::<Environment>() {
                Ok(env) => {
                    tracing::info!("Environment override: DEFAULT_ENVIRONMENT={}", env);
                    self.default_environment = env;
                }
                Err(e) => tracing::warn!("Invalid DEFAULT_ENVIRONMENT: {}. Ignoring.", e),
            }
        }

        if let Ok(val) = std::env::var("DEPLOYMENT_METHOD") {
            tracing::info!("Environment override: DEPLOYMENT_METHOD={}", val);
            self.deployment_method = val;
        }

        if let Ok(val) = std::env::var("REQUIRE_APPROVAL") {
            match parse_bool(&val) {
                Some(v) => {
                    tracing::info!("Environment override: REQUIRE_APPROVAL={}", v);
                    self.require_approval = v;
                }
                None => tracing::warn!(
                    "Invalid value for REQUIRE_APPROVAL: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }

        if let Ok(val) = std::env::var("NOTIFY_ON_DEPLOYMENT") {
            match parse_bool(&val) {
                Some(v) => {
                    tracing::info!("Environment override: NOTIFY_ON_DEPLOYMENT={}", v);
                    self.notify_on_deployment = v;
                }
                None => tracing::warn!(
                    "Invalid value for NOTIFY_ON_DEPLOYMENT: '{}'. Expected true/false. Ignoring.",
                    val
                ),
            }
        }

        if let Ok(val) = std::env::var("BASE_URL") {
            tracing::info!("Environment override: BASE_URL={}", val);
            self.base_url = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.deployment_method.is_empty() {
            anyhow::bail!("deployment_method cannot be empty");
        }

        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }

        if let Some(github) = &self.targets.github {
            if github.remote.is_empty() {
                anyhow::bail!("targets.github.remote cannot be empty");
            }
        }

        if let Some(netlify) = &self.targets.netlify {
            if netlify.site_id.is_empty() {
                anyhow::bail!("targets.netlify.site_id cannot be empty");
            }
        }

        Ok(())
    }
}

/// Resolve a secret value, honoring the "env:VAR_NAME" indirection used for
/// tokens in checked-in configuration files.
pub fn resolve_secret(value: &str) -> Option<String> {
    if let Some(var) = value.strip_prefix("env:") {
        match std::env::var(var) {
            Ok(v) if !v.is_empty() => Some(v),
            _ => {
                tracing::warn!("Secret references unset environment variable {}", var);
                None
            }
        }
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Shared handle over the current configuration snapshot. Reads clone the
/// `Arc`, so a reload never exposes fields from two generations to one
/// reader: a launch keeps the snapshot it took at its start.
#[derive(Debug)]
pub struct ConfigHandle {
    current: RwLock<Arc<LaunchConfig>>,
}

impl ConfigHandle {
    pub fn new(config: LaunchConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Take a consistent snapshot of the current configuration.
    pub fn snapshot(&self) -> Arc<LaunchConfig> {
        self.current.read().clone()
    }

    /// Swap in a freshly loaded configuration. In-flight launches are not
    /// affected.
    pub fn replace(&self, config: LaunchConfig) {
        *self.current.write() = Arc::new(config);
    }
}

fn default_true() -> bool {
    true
}

fn default_environment() -> Environment {
    Environment::Staging
}

fn default_method() -> String {
    "docker".to_string()
}

fn default_base_url() -> String {
    "https://apps.autolaunchstudio.com".to_string()
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from("deploy")
}

fn default_image_prefix() -> String {
    "autolaunch".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_vercel_api() -> String {
    "https://api.vercel.com".to_string()
}

fn default_netlify_api() -> String {
    "https://api.netlify.com".to_string()
}
