//! The per-channel schema registry.
//!
//! Built once from [`EngineConfig`] at startup and immutable afterwards:
//! concurrent readers need no synchronization because nothing is written
//! after `from_config` returns. Every configured grammar is compiled here,
//! so a bad pattern is a startup failure rather than a per-record one.

use regex::Regex;

use crate::channel::Channel;
use crate::config::{DisplayConfig, EngineConfig};
use crate::errors::{CoreError, CoreResult};
use crate::param::{compile_fullmatch, ParamCode, ParamSpec};

/// Expected URL shape for one channel.
#[derive(Debug, Clone)]
pub struct LinkSchema {
    channel: Channel,
    /// `None` never matches any path; this is what guarantees the
    /// `Undefined` classification for unrecognized channels.
    expected_path: Option<String>,
    params: Vec<ParamSpec>,
}

impl LinkSchema {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn expected_path(&self) -> Option<&str> {
        self.expected_path.as_deref()
    }

    /// Ordered required parameter slots.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.expected_path.as_deref() == Some(path)
    }
}

/// Immutable process-wide validation state.
#[derive(Debug)]
pub struct SchemaRegistry {
    base_url: String,
    max_links_per_widget: usize,
    schemas: Vec<LinkSchema>,
    whitespace: Regex,
    template: Regex,
    display: DisplayConfig,
}

impl SchemaRegistry {
    /// Compile all grammars and assemble the registry.
    ///
    /// This is the only fallible step of the engine; any error here is a
    /// configuration defect and should abort startup.
    pub fn from_config(cfg: &EngineConfig) -> CoreResult<Self> {
        cfg.validate()?;

        let mut schemas = Vec::with_capacity(Channel::RECOGNIZED.len() + 1);
        for channel in Channel::RECOGNIZED {
            schemas.push(build_schema(channel, cfg)?);
        }
        schemas.push(build_schema(Channel::Undefined, cfg)?);

        let whitespace = Regex::new(&cfg.whitespace_pattern)
            .map_err(|e| CoreError::pattern("whitespace", e.to_string()))?;
        let template = compile_fullmatch("template", &cfg.template_pattern)?;

        Ok(Self {
            base_url: cfg.base_url.clone(),
            max_links_per_widget: cfg.max_links_per_widget,
            schemas,
            whitespace,
            template,
            display: cfg.display.clone(),
        })
    }

    pub fn schema(&self, channel: Channel) -> &LinkSchema {
        self.schemas
            .iter()
            .find(|s| s.channel() == channel)
            .unwrap_or_else(|| &self.schemas[self.schemas.len() - 1])
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_links_per_widget(&self) -> usize {
        self.max_links_per_widget
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Search (not full-match) the raw URL for whitespace or `%20`.
    pub fn has_whitespace(&self, raw_url: &str) -> bool {
        self.whitespace.is_match(raw_url)
    }

    /// Full-match the raw URL against the composed cross-channel grammar.
    pub fn matches_template(&self, raw_url: &str) -> bool {
        self.template.is_match(raw_url)
    }
}

fn build_schema(channel: Channel, cfg: &EngineConfig) -> CoreResult<LinkSchema> {
    let (path, slots): (&str, &[(&str, ParamCode)]) = match channel {
        Channel::Vk => (
            "form",
            &[
                ("opaId", ParamCode::OpaId),
                ("utm_source", ParamCode::Source),
                ("utm_medium", ParamCode::RegCode),
                ("utm_campaign", ParamCode::Ogrn),
            ],
        ),
        Channel::Vk1 => (
            "og/org-activities",
            &[
                ("reg_code", ParamCode::RegCode),
                ("utm_source", ParamCode::Source),
                ("utm_medium", ParamCode::RegCode),
                ("utm_campaign", ParamCode::Ogrn),
            ],
        ),
        Channel::Vk2 => (
            "og/org-activities",
            &[
                ("mun_code", ParamCode::MunCode),
                ("utm_source", ParamCode::Source),
                ("utm_medium", ParamCode::RegCode),
                ("utm_campaign", ParamCode::Ogrn),
            ],
        ),
        Channel::Undefined => {
            return Ok(LinkSchema {
                channel,
                expected_path: None,
                params: Vec::new(),
            })
        }
    };

    let mut params = Vec::with_capacity(slots.len());
    for (name, code) in slots {
        let pattern = grammar_for(*code, channel, cfg);
        params.push(ParamSpec::new(*name, *code, pattern)?);
    }

    Ok(LinkSchema {
        channel,
        expected_path: Some(path.to_string()),
        params,
    })
}

/// Grammar selection: configured override first, then the built-in default.
///
/// `Source` is never overridable: its grammar is the channel literal.
fn grammar_for(code: ParamCode, channel: Channel, cfg: &EngineConfig) -> Option<String> {
    match code {
        ParamCode::Source | ParamCode::Undefined => code.default_pattern(channel),
        _ => cfg
            .grammar_overrides
            .get(code.key())
            .cloned()
            .or_else(|| code.default_pattern(channel)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_builds_from_defaults() {
        let reg = SchemaRegistry::from_config(&EngineConfig::default()).unwrap();
        assert_eq!(reg.schema(Channel::Vk).expected_path(), Some("form"));
        assert_eq!(
            reg.schema(Channel::Vk1).expected_path(),
            Some("og/org-activities")
        );
        assert_eq!(
            reg.schema(Channel::Vk2).expected_path(),
            Some("og/org-activities")
        );
        assert_eq!(reg.schema(Channel::Undefined).expected_path(), None);
        assert!(reg.schema(Channel::Undefined).params().is_empty());
    }

    #[test]
    fn undefined_schema_matches_no_path() {
        let reg = SchemaRegistry::from_config(&EngineConfig::default()).unwrap();
        let undefined = reg.schema(Channel::Undefined);
        for path in ["", "form", "og/org-activities", "anything"] {
            assert!(!undefined.matches_path(path));
        }
    }

    #[test]
    fn schema_param_order_is_declaration_order() {
        let reg = SchemaRegistry::from_config(&EngineConfig::default()).unwrap();
        let names: Vec<&str> = reg
            .schema(Channel::Vk)
            .params()
            .iter()
            .map(|p| p.name())
            .collect();
        assert_eq!(names, ["opaId", "utm_source", "utm_medium", "utm_campaign"]);
    }

    #[test]
    fn grammar_override_applies() {
        let mut cfg = EngineConfig::default();
        cfg.grammar_overrides
            .insert("ID".to_string(), r"\d{4}".to_string());
        let reg = SchemaRegistry::from_config(&cfg).unwrap();
        let spec = reg.schema(Channel::Vk).param("opaId").unwrap();
        assert!(spec.bind(Some("1234")).valid);
        assert!(!spec.bind(Some("123")).valid);
    }

    #[test]
    fn invalid_override_fails_at_build() {
        let mut cfg = EngineConfig::default();
        cfg.grammar_overrides
            .insert("OGRN".to_string(), "(".to_string());
        assert!(SchemaRegistry::from_config(&cfg).is_err());
    }

    #[test]
    fn whitespace_is_search_semantics() {
        let reg = SchemaRegistry::from_config(&EngineConfig::default()).unwrap();
        assert!(reg.has_whitespace("https://x/a b"));
        assert!(reg.has_whitespace("https://x/a%20b"));
        assert!(!reg.has_whitespace("https://x/ab"));
    }

    #[test]
    fn template_is_full_match_semantics() {
        let reg = SchemaRegistry::from_config(&EngineConfig::default()).unwrap();
        let ok = "https://pos.gosuslugi.ru/form/?opaId=123&utm_source=vk&utm_medium=45&utm_campaign=1234567890123";
        assert!(reg.matches_template(ok));
        assert!(!reg.matches_template(&format!("{ok}&extra=1")));
        assert!(!reg.matches_template(&format!("x{ok}")));
    }
}
