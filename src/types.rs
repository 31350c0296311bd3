//! Common types used throughout scroll-pager
//!
//! Shared type aliases and small enums used by more than one module.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Fetch Mode
// ============================================================================

/// Shape of response a page request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// JSON body `{ html, has_next, page }`
    #[default]
    Structured,
    /// Raw markup fragment as the body
    Markup,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Markup => write!(f, "markup"),
        }
    }
}

// ============================================================================
// Fallback Policy
// ============================================================================

/// What to do when a structured page request fails
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Leave state untouched; the next qualifying scroll retries
    #[default]
    None,
    /// Retry the same page once as a plain markup request
    Markup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_policy_serde() {
        let policy: FallbackPolicy = serde_json::from_str("\"markup\"").unwrap();
        assert_eq!(policy, FallbackPolicy::Markup);
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::None);
    }

    #[test]
    fn test_fetch_mode_display() {
        assert_eq!(FetchMode::Structured.to_string(), "structured");
        assert_eq!(FetchMode::Markup.to_string(), "markup");
    }
}
