//! Per-request locale selection
//!
//! `?locale=` wins, then the first `Accept-Language` tag, then the
//! configured default locale.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts, HeaderMap},
};
use serde::Deserialize;

use crate::AppState;

/// Locale the request is served in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale(pub String);

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LocaleQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.locale)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let locale = from_query
            .or_else(|| accept_language(&parts.headers))
            .unwrap_or_else(|| state.config.default_locale.clone());

        Ok(RequestLocale(locale))
    }
}

/// First concrete language tag of the `Accept-Language` header
pub fn accept_language(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(ACCEPT_LANGUAGE)?.to_str().ok()?;
    header
        .split(',')
        .filter_map(|part| part.split(';').next())
        .map(str::trim)
        .find(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_string)
}
