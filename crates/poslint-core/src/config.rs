//! Engine configuration.
//!
//! Explicit, caller-supplied configuration for the classification engine.
//! The core crate never reads environment variables or files; higher layers
//! (the CLI) load their own configuration and hand a fully-formed
//! [`EngineConfig`] to [`crate::schema::SchemaRegistry::from_config`], which
//! compiles and validates every pattern exactly once at startup.
//!
//! Defaults reproduce the production compliance template of the external
//! feedback-platform service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, CoreResult};

/// Base URL of the audited external service.
pub const DEFAULT_BASE_URL: &str = "https://pos.gosuslugi.ru";

/// Literal whitespace or an escaped space anywhere in the raw URL.
pub const DEFAULT_WHITESPACE_PATTERN: &str = r"\s|%20";

/// The composed cross-channel link grammar.
///
/// Independently authored from the per-parameter grammars: it pins the whole
/// literal URL shape (path form, parameter order, `&` separators) and is
/// matched against the raw URL as a final cross-check.
pub const DEFAULT_TEMPLATE_PATTERN: &str = r"https://pos\.gosuslugi\.ru/(?:form/\?(opaId=\d+)|og/org-activities\?(?:(reg_code=\d{2}|111|711|7114)|(mun_code=\d{8})))&(utm_source=vk|utm_source=vk[12])&(utm_medium=\d{2}|111|711|7114)&(utm_campaign=\d{13})";

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Only menu links starting with this prefix are audited.
    pub base_url: String,

    /// Expected number of links per widget; 0 disables the count check.
    pub max_links_per_widget: usize,

    /// Per-code grammar overrides, keyed by [`crate::param::ParamCode::key`].
    pub grammar_overrides: BTreeMap<String, String>,

    /// Searched (not full-matched) against the raw URL.
    pub whitespace_pattern: String,

    /// Full-matched against the raw URL.
    pub template_pattern: String,

    pub display: DisplayConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_links_per_widget: 0,
            grammar_overrides: BTreeMap::new(),
            whitespace_pattern: DEFAULT_WHITESPACE_PATTERN.to_string(),
            template_pattern: DEFAULT_TEMPLATE_PATTERN.to_string(),
            display: DisplayConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Structural validation that does not require compiling patterns.
    ///
    /// Pattern compilation (and its errors) happens in
    /// [`crate::schema::SchemaRegistry::from_config`].
    pub fn validate(&self) -> CoreResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::config("base_url must not be empty"));
        }
        if self.display.param_line.trim().is_empty() {
            return Err(CoreError::config("display.param_line must not be empty"));
        }
        Ok(())
    }
}

/// Display text and diagnostic templates.
///
/// Looked up at render time; identity enums carry no display text. Unknown
/// keys fall back to the stable key itself, so partial overrides are safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Per-parameter diagnostic line. Placeholders: `{code}`, `{param}`,
    /// `{pattern}`, `{value}`, `{hint}`, `{valid}`.
    pub param_line: String,

    /// Hint text per parameter code key.
    pub param_hints: BTreeMap<String, String>,

    /// Human text per link status key.
    pub status_text: BTreeMap<String, String>,

    /// Human text per widget result key.
    pub result_text: BTreeMap<String, String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut param_hints = BTreeMap::new();
        param_hints.insert("ID".to_string(), "Only digits expected".to_string());
        param_hints.insert(
            "REG-CODE".to_string(),
            "Only 2 digits or 111|711|7114 expected".to_string(),
        );
        param_hints.insert("MUN-CODE".to_string(), "Only 8 digits expected".to_string());
        param_hints.insert("OGRN".to_string(), "Only 13 digits expected".to_string());
        param_hints.insert(
            "SOURCE".to_string(),
            "Exact channel literal expected".to_string(),
        );
        param_hints.insert("UNDEFINED".to_string(), "Undefined UTM-code".to_string());

        let mut status_text = BTreeMap::new();
        status_text.insert("VALID".to_string(), "Correct".to_string());
        status_text.insert(
            "NOT_MATCH".to_string(),
            "Invalid, url don't match pattern".to_string(),
        );
        status_text.insert("UTM_INVALID".to_string(), "Invalid UTM code value".to_string());
        status_text.insert("SPACER".to_string(), "Invalid, url contains spaces".to_string());
        status_text.insert(
            "UNDEFINED".to_string(),
            "Undefined link path or source".to_string(),
        );

        let mut result_text = BTreeMap::new();
        result_text.insert(
            "CORRECT".to_string(),
            "Widgets exists and urls is correct".to_string(),
        );
        result_text.insert(
            "INVALID".to_string(),
            "Widgets exists and urls NOT valid".to_string(),
        );
        result_text.insert(
            "LINKS_COUNT".to_string(),
            "Links count does not match expected".to_string(),
        );
        result_text.insert("MISSING".to_string(), "Widgets NOT exists".to_string());
        result_text.insert("TIMEOUT".to_string(), "Can't get url page data".to_string());
        result_text.insert(
            "ERROR".to_string(),
            "NOT valid url or parsing errors".to_string(),
        );

        Self {
            param_line: "[{code}] {param}={value} ({hint}; pattern {pattern}) valid={valid}"
                .to_string(),
            param_hints,
            status_text,
            result_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_base_url_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.base_url = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn default_display_covers_all_keys() {
        let d = DisplayConfig::default();
        for key in ["VALID", "NOT_MATCH", "UTM_INVALID", "SPACER", "UNDEFINED"] {
            assert!(d.status_text.contains_key(key), "missing status {key}");
        }
        for key in ["CORRECT", "INVALID", "LINKS_COUNT", "MISSING", "TIMEOUT", "ERROR"] {
            assert!(d.result_text.contains_key(key), "missing result {key}");
        }
    }
}
