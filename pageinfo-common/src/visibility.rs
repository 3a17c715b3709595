//! Default visibility from authorization hints
//!
//! Deny ("requires authorization") and allow ("allow anonymous") signals are
//! each reduced to the most specific scope they were found at. A page is
//! visible by default only when the allow signal is strictly more specific
//! than the deny signal. An explicit visibility annotation always wins.

use crate::model::AuthorizationHints;

/// Scope an authorization signal was found at, least to most specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SignalLevel {
    None = 0,
    Global = 1,
    Type = 2,
    Method = 3,
}

impl SignalLevel {
    fn most_specific(global: bool, type_level: bool, method: bool) -> Self {
        if method {
            SignalLevel::Method
        } else if type_level {
            SignalLevel::Type
        } else if global {
            SignalLevel::Global
        } else {
            SignalLevel::None
        }
    }
}

pub fn deny_level(hints: &AuthorizationHints) -> SignalLevel {
    SignalLevel::most_specific(hints.global_deny, hints.type_deny, hints.method_deny)
}

pub fn allow_level(hints: &AuthorizationHints) -> SignalLevel {
    SignalLevel::most_specific(hints.global_allow, hints.type_allow, hints.method_allow)
}

/// Visibility derived from authorization hints alone.
///
/// Note that a handler with no hints at all resolves to `false`.
pub fn default_visibility(hints: &AuthorizationHints) -> bool {
    deny_level(hints) < allow_level(hints)
}

/// Explicit visibility if declared, otherwise the authorization-derived default
pub fn resolve_visibility(explicit: Option<bool>, hints: &AuthorizationHints) -> bool {
    explicit.unwrap_or_else(|| default_visibility(hints))
}
