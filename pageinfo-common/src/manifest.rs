//! TOML handler manifest
//!
//! A manifest lists handler descriptors as `[[handler]]` tables and, per
//! locale, named text resources:
//!
//! ```toml
//! [[handler]]
//! action = "Index"
//! controller = "Home"
//! authorization = { global_allow = true }
//! page = { title = "Home", title_resource = "home_title" }
//! menu = { order = 1 }
//!
//! [resources.nl-NL]
//! home_title = "Start"
//! ```

use crate::config::ConfigGate;
use crate::discovery::{discover, Discovered, MetadataSource, ResourceResolver};
use crate::model::{AnnotationRecord, HandlerDescriptor};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Parsed manifest file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(rename = "handler")]
    pub handlers: Vec<HandlerDescriptor>,
    /// locale → resource name → text
    pub resources: HashMap<String, HashMap<String, String>>,
}

impl Manifest {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl ResourceResolver for Manifest {
    /// Exact locale first, then its language (`nl` for `nl-NL`)
    fn resolve(&self, locale: &str, name: &str) -> Option<String> {
        if let Some(text) = self.resources.get(locale).and_then(|r| r.get(name)) {
            return Some(text.clone());
        }
        let language = locale.split(|c| c == '-' || c == '_').next()?;
        self.resources
            .get(language)
            .and_then(|r| r.get(name))
            .cloned()
    }
}

enum Origin {
    File(PathBuf),
    Inline(Manifest),
}

/// Metadata source reading handler descriptors from a manifest
pub struct ManifestSource {
    origin: Origin,
    gate: Arc<dyn ConfigGate>,
}

impl ManifestSource {
    /// Source re-reading `path` for every locale it builds
    pub fn from_path(path: impl Into<PathBuf>, gate: Arc<dyn ConfigGate>) -> Self {
        Self {
            origin: Origin::File(path.into()),
            gate,
        }
    }

    pub fn from_manifest(manifest: Manifest, gate: Arc<dyn ConfigGate>) -> Self {
        Self {
            origin: Origin::Inline(manifest),
            gate,
        }
    }
}

impl MetadataSource for ManifestSource {
    fn handlers(&self, locale: &str) -> Result<Vec<AnnotationRecord>> {
        self.discover(locale).map(|discovered| discovered.records)
    }

    fn discover(&self, locale: &str) -> Result<Discovered> {
        let loaded;
        let manifest = match &self.origin {
            Origin::File(path) => {
                loaded = Manifest::from_file(path).map_err(|e| {
                    Error::Discovery(format!("cannot load manifest {}: {}", path.display(), e))
                })?;
                &loaded
            }
            Origin::Inline(manifest) => manifest,
        };

        let discovered = discover(&manifest.handlers, locale, self.gate.as_ref(), manifest)?;
        info!(
            "Discovered {} of {} handlers for locale '{}' ({} gated URLs)",
            discovered.records.len(),
            manifest.handlers.len(),
            locale,
            discovered.gated_urls.len()
        );
        Ok(discovered)
    }
}
