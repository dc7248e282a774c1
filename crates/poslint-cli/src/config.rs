//! CLI configuration.
//!
//! Loaded once from a TOML file at startup. The `[parsing]` section maps
//! directly onto the engine's `EngineConfig` (base URL, link count bound,
//! grammar overrides, display templates); the `[vk]` and `[export]` sections
//! belong to the plumbing. A missing file falls back to full defaults so the
//! offline subcommands work without any setup. The access token may come
//! from the environment (`POSLINT_VK_TOKEN`), which wins over the file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use poslint_core::config::EngineConfig;

/// Environment variable that overrides the configured access token.
pub const TOKEN_ENV: &str = "POSLINT_VK_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vk: VkSection,
    pub parsing: EngineConfig,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VkSection {
    pub access_token: String,
    pub api_version: String,
    /// Group ids per API call.
    pub batch_size: usize,
    pub max_retries: usize,
    pub retry_base_ms: u64,
    /// Extra payload fields to request; `menu` is always included.
    pub fields: Vec<String>,
}

impl Default for VkSection {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_version: poslint_vk::DEFAULT_API_VERSION.to_string(),
            batch_size: poslint_vk::DEFAULT_BATCH_SIZE,
            max_retries: 5,
            retry_base_ms: 500,
            fields: vec!["menu".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Exported columns; `pos_links` expands into per-link column triples,
    /// any other name is looked up in the payload (dotted paths allowed).
    pub fields: Vec<String>,
    pub csv_delimiter: char,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            fields: vec![
                "url".to_string(),
                "pos_result".to_string(),
                "pos_links".to_string(),
            ],
            csv_delimiter: ',',
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::debug!(path, "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        let cfg: AppConfig =
            toml::from_str(&raw).with_context(|| format!("failed to parse config file {path}"))?;
        Ok(cfg)
    }

    /// Resolved access token: environment first, then the config file.
    pub fn access_token(&self) -> Option<String> {
        std::env::var(TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                let t = self.vk.access_token.trim();
                (!t.is_empty()).then(|| t.to_string())
            })
    }

    /// Payload fields for `groups.getById`, always including `menu`.
    pub fn request_fields(&self) -> Vec<String> {
        let mut fields = self.vk.fields.clone();
        if !fields.iter().any(|f| f == "menu") {
            fields.push("menu".to_string());
        }
        fields
    }

    pub fn vk_client_config(&self) -> poslint_vk::VkClientConfig {
        poslint_vk::VkClientConfig {
            access_token: self.access_token().unwrap_or_default(),
            api_version: self.vk.api_version.clone(),
            api_base: poslint_vk::DEFAULT_API_BASE.to_string(),
            max_retries: self.vk.max_retries,
            retry_base_ms: self.vk.retry_base_ms,
        }
    }
}
