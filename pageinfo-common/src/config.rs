//! Configuration loading and the config gate
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `PAGEINFO_CONFIG` environment variable
//! 3. Platform config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal; the engine starts on defaults.

use crate::model::ConfigCondition;
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PAGEINFO_CONFIG";

/// Engine configuration (TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Locale used when a request does not name one
    pub default_locale: String,
    /// Handler manifest consumed by `ManifestSource`
    pub manifest_path: Option<PathBuf>,
    /// Fail discovery when two handlers declare the same route key
    pub reject_duplicate_keys: bool,
    pub sitemap: SitemapConfig,
    /// Handler served instead of a route whose config gate is closed
    pub not_found_route: Option<NotFoundRoute>,
    /// Key-value store backing `allow_if_config` conditions
    pub settings: HashMap<String, String>,
    /// Legacy URL → target URL, registered at startup
    pub redirects: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-US".to_string(),
            manifest_path: None,
            reject_duplicate_keys: true,
            sitemap: SitemapConfig::default(),
            not_found_route: None,
            settings: HashMap::new(),
            redirects: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    /// Scheme, host and optional port prepended to page URLs
    pub base_url: String,
    /// List every page, including hidden and no-index ones
    pub debug: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotFoundRoute {
    pub controller: String,
    pub action: String,
}

impl EngineConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a config file from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        // Manifest paths are relative to the config file
        if let (Some(manifest), Some(dir)) = (config.manifest_path.as_ref(), path.parent()) {
            if manifest.is_relative() {
                config.manifest_path = Some(dir.join(manifest));
            }
        }
        Ok(config)
    }

    /// Resolve and load the configuration following the priority order
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            info!("Loading config from command line: {}", path.display());
            return Self::from_file(path);
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path);
            return Self::from_file(Path::new(&path));
        }

        // Priority 3: Platform config file
        if let Some(path) = default_config_file() {
            info!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }

        // Priority 4: Compiled defaults
        warn!("No config file found, using compiled defaults");
        Ok(Self::default())
    }
}

/// Get the platform config file, if one exists
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("pageinfo").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/pageinfo/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// External key-value lookup queried by `allow_if_config` conditions
pub trait ConfigGate: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

impl<F> ConfigGate for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Config gate backed by the `settings` table, with environment variables
/// of the same name taking precedence.
#[derive(Debug, Clone, Default)]
pub struct SettingsGate {
    settings: HashMap<String, String>,
}

impl SettingsGate {
    pub fn new(settings: HashMap<String, String>) -> Self {
        Self { settings }
    }
}

impl ConfigGate for SettingsGate {
    fn lookup(&self, key: &str) -> Option<String> {
        if let Ok(value) = std::env::var(key) {
            return Some(value);
        }
        self.settings.get(key).cloned()
    }
}

/// A single condition holds when both sides are non-empty and the stored
/// value equals the expected one, ignoring case.
pub fn condition_holds(condition: &ConfigCondition, gate: &dyn ConfigGate) -> bool {
    if condition.key.is_empty() || condition.value.is_empty() {
        return false;
    }
    match gate.lookup(&condition.key) {
        Some(stored) if !stored.is_empty() => stored.eq_ignore_ascii_case(&condition.value),
        _ => false,
    }
}

/// A handler is allowed when it has no conditions or at least one holds
pub fn is_allowed(conditions: &[ConfigCondition], gate: &dyn ConfigGate) -> bool {
    if conditions.is_empty() {
        return true;
    }
    let allowed = conditions.iter().any(|c| condition_holds(c, gate));
    if !allowed {
        debug!("Config gate closed for conditions {:?}", conditions);
    }
    allowed
}
