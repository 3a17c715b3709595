//! Sitemap items
//!
//! XML rendering belongs to the consumer; this module only decides which
//! pages are listed and with which absolute URL.

use crate::tree::Tree;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

/// One `<url>` entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteMapItem {
    pub url: String,
    pub last_modified: Option<NaiveDate>,
    pub change_frequency: Option<ChangeFrequency>,
    pub priority: Option<f64>,
}

impl SiteMapItem {
    pub fn new(
        url: impl Into<String>,
        last_modified: Option<NaiveDate>,
        change_frequency: Option<ChangeFrequency>,
        priority: Option<f64>,
    ) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::InvalidArgument("sitemap URL must not be empty".to_string()));
        }
        Ok(Self {
            url,
            last_modified,
            change_frequency,
            priority,
        })
    }
}

/// Join a base URL (`scheme://host[:port]`) and a relative page URL.
///
/// The result always ends with a slash. An empty base yields the relative
/// URL on its own.
pub fn absolute_url(base_url: &str, relative_url: &str) -> String {
    let relative = relative_url.trim_start_matches('/');
    let base = base_url.trim_end_matches('/');

    let mut url = if base.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{}", base, relative)
    };
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
    url
}

/// Sitemap items for every page (`debug`) or only for visible, indexable pages
pub fn site_map_items(tree: &Tree, base_url: &str, debug: bool) -> Vec<SiteMapItem> {
    tree.flat()
        .filter(|node| debug || (node.record().visible && !node.record().no_index))
        .filter_map(|node| {
            SiteMapItem::new(
                absolute_url(base_url, node.page_url()),
                None,
                Some(ChangeFrequency::Always),
                Some(1.0),
            )
            .ok()
        })
        .collect()
}
