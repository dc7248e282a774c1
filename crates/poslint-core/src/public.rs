//! The audited group record.
//!
//! `Public` binds a stable identity (the canonical group URL) to the raw
//! payload and the widget record. It holds no decision logic of its own:
//! classification happens in [`crate::link`] and [`crate::widget`].

use serde::Serialize;
use serde_json::Value;

use crate::schema::SchemaRegistry;
use crate::widget::{WidgetRecord, WidgetResult};

/// One group under audit.
#[derive(Debug, Clone, Serialize)]
pub struct Public {
    url: String,
    data: Option<Value>,
    pub widget: WidgetRecord,
}

impl Public {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: None,
            widget: WidgetRecord::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The group identifier: the last path segment of the group URL.
    pub fn identify(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or("")
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Dotted-path field lookup into the stored payload, rendered as text
    /// for export. Missing fields render as the empty string.
    pub fn field_data(&self, field: &str) -> String {
        let Some(data) = &self.data else {
            return String::new();
        };

        let mut current = data;
        for part in field.split('.') {
            match current.get(part) {
                Some(v) => current = v,
                None => return String::new(),
            }
        }

        match current {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Ingest one fetched payload.
    ///
    /// An empty payload sets the widget verdict to `Error`; a non-empty one
    /// is handed to the widget aggregator and stored. Calling this again
    /// replaces the previous payload and widget state wholesale, except
    /// when the verdict was forced by the caller, which is never overwritten.
    pub fn parse(&mut self, payload: Value, registry: &SchemaRegistry) -> &mut Self {
        if self.widget.is_forced() {
            return self;
        }

        if payload_is_empty(&payload) {
            self.widget.set_result(WidgetResult::Error);
            return self;
        }

        self.widget = WidgetRecord::new();
        self.widget.parse_payload(&payload, registry);
        self.data = Some(payload);
        self
    }
}

fn payload_is_empty(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(o) => o.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_config(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn identify_is_the_last_path_segment() {
        assert_eq!(Public::new("https://vk.com/club123").identify(), "club123");
        assert_eq!(Public::new("https://vk.com/some_group").identify(), "some_group");
    }

    #[test]
    fn empty_payload_forces_error_verdict() {
        let reg = registry();
        let mut p = Public::new("https://vk.com/club1");
        p.parse(json!({}), &reg);
        assert_eq!(p.widget.result(), WidgetResult::Error);
        assert!(p.data().is_none());
    }

    #[test]
    fn non_empty_payload_is_aggregated_and_stored() {
        let reg = registry();
        let mut p = Public::new("https://vk.com/club1");
        p.parse(json!({ "name": "x" }), &reg);
        assert_eq!(p.widget.result(), WidgetResult::Missing);
        assert!(p.data().is_some());
    }

    #[test]
    fn reparse_replaces_prior_state() {
        let reg = registry();
        let valid = "https://pos.gosuslugi.ru/form/?opaId=123&utm_source=vk&utm_medium=45&utm_campaign=1234567890123";
        let mut p = Public::new("https://vk.com/club1");

        p.parse(json!({ "menu": { "items": [{ "url": valid }] } }), &reg);
        assert_eq!(p.widget.result(), WidgetResult::Correct);

        p.parse(json!({ "name": "no menu this time" }), &reg);
        assert_eq!(p.widget.result(), WidgetResult::Missing);
        assert!(p.widget.links().is_empty());
    }

    #[test]
    fn forced_result_survives_parse() {
        let reg = registry();
        let mut p = Public::new("https://vk.com/club1");
        p.widget.force_result(WidgetResult::Timeout);
        p.parse(json!({ "menu": { "items": [] } }), &reg);
        assert_eq!(p.widget.result(), WidgetResult::Timeout);
    }

    #[test]
    fn field_data_traverses_dotted_paths() {
        let reg = registry();
        let mut p = Public::new("https://vk.com/club1");
        p.parse(
            json!({ "name": "Group", "counters": { "members": 42 } }),
            &reg,
        );
        assert_eq!(p.field_data("name"), "Group");
        assert_eq!(p.field_data("counters.members"), "42");
        assert_eq!(p.field_data("missing.path"), "");
    }
}
