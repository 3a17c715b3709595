//! Explicit permanent redirect registrations
//!
//! Complements the redirects declared on handlers. Registrations are made
//! at startup; lookups happen per request and only take a read lock.

use crate::model::normalize_lookup_url;
use crate::query;
use crate::tree::Tree;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Thread-safe map of legacy URL to target URL
#[derive(Debug, Default)]
pub struct RedirectRegistry {
    redirects: RwLock<BTreeMap<String, String>>,
}

impl RedirectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `redirect_url` → `target_url`.
    ///
    /// Both must be non-empty. Registering the same pair again is a no-op;
    /// registering a different target for a known source is a conflict.
    pub fn add_redirect(&self, redirect_url: &str, target_url: &str) -> Result<()> {
        let Some(source) = normalize_lookup_url(redirect_url) else {
            return Err(Error::InvalidArgument("redirect URL must not be empty".to_string()));
        };
        let target = target_url.trim().trim_start_matches('/');
        if target.is_empty() {
            return Err(Error::InvalidArgument("target URL must not be empty".to_string()));
        }

        // Entries are plain strings; a poisoned lock cannot leave them half-written
        let mut redirects = self.redirects.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = redirects.get(&source) {
            if existing.eq_ignore_ascii_case(target) {
                debug!("Redirect {} -> {} already registered", source, existing);
                return Ok(());
            }
            return Err(Error::RedirectConflict {
                source_url: source,
                existing: existing.clone(),
                requested: target.to_string(),
            });
        }

        info!("Registered permanent redirect {} -> {}", source, target);
        redirects.insert(source, target.to_string());
        Ok(())
    }

    /// Register a redirect to the page URL of `controller.action`
    pub fn add_redirect_to_handler(
        &self,
        redirect_url: &str,
        tree: &Tree,
        action: &str,
        controller: &str,
    ) -> Result<()> {
        if action.is_empty() || controller.is_empty() {
            return Err(Error::InvalidArgument("action and controller must not be empty".to_string()));
        }
        let node = query::find_by_handler(tree, action, controller)
            .ok_or_else(|| Error::NotFound(format!("handler {}.{}", controller, action)))?;
        self.add_redirect(redirect_url, node.page_url())
    }

    /// Register every pair, stopping at the first failure
    pub fn add_range<'a, I>(&self, redirects: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (source, target) in redirects {
            self.add_redirect(source, target)?;
        }
        Ok(())
    }

    /// Resolve an incoming relative URL to its redirect target.
    ///
    /// The result starts with a slash. `None` means no redirect applies,
    /// including a target that equals the source.
    pub fn map_redirect(&self, url: &str) -> Option<String> {
        let source = normalize_lookup_url(url)?;
        let redirects = self.redirects.read().unwrap_or_else(PoisonError::into_inner);
        let target = redirects.get(&source)?;
        redirect_target(&source, target)
    }

    /// Snapshot of all registrations
    pub fn permanent_redirects(&self) -> BTreeMap<String, String> {
        self.redirects.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.redirects.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slash-prefixed target, or `None` when empty or pointing at itself
pub fn redirect_target(source: &str, target: &str) -> Option<String> {
    let bare = target.trim_start_matches('/');
    if bare.is_empty() || bare.eq_ignore_ascii_case(source) {
        return None;
    }
    Some(format!("/{}", bare))
}
