//! Widget-level aggregation.
//!
//! A widget is the menu section of one group payload. Scanning it produces
//! an ordered sequence of [`LinkRecord`] (payload order), and the ordered
//! precedence policy in [`aggregate`] derives a single [`WidgetResult`].
//! `Timeout` and `Error` are never produced by the aggregation itself; they
//! are injected by the I/O layer through [`WidgetRecord::force_result`] and
//! survive any later parse attempt.

use serde::Serialize;
use serde_json::Value;

use crate::link::{validate_link, LinkRecord, LinkStatus};
use crate::schema::SchemaRegistry;

/// Terminal verdict for one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WidgetResult {
    Correct,
    Invalid,
    LinkCountMismatch,
    Missing,
    /// Injected by the caller on a retryable fetch failure.
    Timeout,
    /// Injected by the caller on a permanent failure, or the safety fallback.
    Error,
}

impl WidgetResult {
    /// Stable key used for display-text lookup, counters, and export.
    pub fn key(&self) -> &'static str {
        match self {
            WidgetResult::Correct => "CORRECT",
            WidgetResult::Invalid => "INVALID",
            WidgetResult::LinkCountMismatch => "LINKS_COUNT",
            WidgetResult::Missing => "MISSING",
            WidgetResult::Timeout => "TIMEOUT",
            WidgetResult::Error => "ERROR",
        }
    }

    /// All verdicts, in a stable order (used for counter initialization).
    pub const ALL: [WidgetResult; 6] = [
        WidgetResult::Correct,
        WidgetResult::Invalid,
        WidgetResult::LinkCountMismatch,
        WidgetResult::Missing,
        WidgetResult::Timeout,
        WidgetResult::Error,
    ];
}

/// One widget: its audited links (payload order) and its verdict.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetRecord {
    links: Vec<LinkRecord>,
    result: WidgetResult,
    /// Set when the result was injected by the caller; a forced result is
    /// never recomputed.
    forced: bool,
}

impl Default for WidgetRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRecord {
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            result: WidgetResult::Error,
            forced: false,
        }
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn result(&self) -> WidgetResult {
        self.result
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Set the verdict without marking it forced (engine-internal outcome;
    /// a later parse may replace it).
    pub fn set_result(&mut self, result: WidgetResult) {
        self.result = result;
    }

    /// Inject a caller-side verdict (`Timeout`/`Error` on I/O failure).
    /// Forced verdicts are sticky: later parse calls leave them untouched.
    pub fn force_result(&mut self, result: WidgetResult) {
        self.result = result;
        self.forced = true;
    }

    /// Scan a payload's menu section and derive the verdict.
    ///
    /// Only items whose `url` starts with the registry's base URL are
    /// audited; everything else is ignored entirely, not recorded and not
    /// counted. An absent menu yields no links and therefore `Missing`.
    pub fn parse_payload(&mut self, payload: &Value, registry: &SchemaRegistry) {
        if self.forced {
            return;
        }

        let mut links = Vec::new();
        if let Some(items) = payload
            .get("menu")
            .and_then(|m| m.get("items"))
            .and_then(|i| i.as_array())
        {
            for item in items {
                let Some(url) = item.get("url").and_then(|u| u.as_str()) else {
                    continue;
                };
                if url.starts_with(registry.base_url()) {
                    links.push(validate_link(url, registry));
                }
            }
        }

        self.result = aggregate(&links, registry.max_links_per_widget());
        self.links = links;
    }
}

/// Derive one verdict from the collected links. First matching rule wins:
///
/// 1. no links → `Missing`
/// 2. non-zero expected count and a different actual count → `LinkCountMismatch`
/// 3. all links valid → `Correct`
/// 4. any failing link → `Invalid`
/// 5. fallback (unreachable with the closed status set) → `Error`
///
/// The count check runs before per-link validity on purpose: a widget of
/// fully valid links still fails on a wrong count.
pub fn aggregate(links: &[LinkRecord], max_links: usize) -> WidgetResult {
    if links.is_empty() {
        return WidgetResult::Missing;
    }

    if max_links != 0 && links.len() != max_links {
        return WidgetResult::LinkCountMismatch;
    }

    if links.iter().all(|l| l.status.is_valid()) {
        return WidgetResult::Correct;
    }

    if links.iter().any(|l| {
        matches!(
            l.status,
            LinkStatus::NotMatch | LinkStatus::UtmInvalid | LinkStatus::Spacer | LinkStatus::Undefined
        )
    }) {
        return WidgetResult::Invalid;
    }

    WidgetResult::Error
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use serde_json::json;

    const VALID_FORM: &str = "https://pos.gosuslugi.ru/form/?opaId=123&utm_source=vk&utm_medium=45&utm_campaign=1234567890123";

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_config(&EngineConfig::default()).unwrap()
    }

    fn registry_with_max(max: usize) -> SchemaRegistry {
        let mut cfg = EngineConfig::default();
        cfg.max_links_per_widget = max;
        SchemaRegistry::from_config(&cfg).unwrap()
    }

    fn payload_with_urls(urls: &[&str]) -> Value {
        let items: Vec<Value> = urls.iter().map(|u| json!({ "url": u })).collect();
        json!({ "menu": { "items": items } })
    }

    #[test]
    fn absent_menu_is_missing() {
        let mut w = WidgetRecord::new();
        w.parse_payload(&json!({ "name": "group" }), &registry());
        assert_eq!(w.result(), WidgetResult::Missing);
        assert!(w.links().is_empty());
    }

    #[test]
    fn empty_items_is_missing() {
        let mut w = WidgetRecord::new();
        w.parse_payload(&payload_with_urls(&[]), &registry());
        assert_eq!(w.result(), WidgetResult::Missing);
    }

    #[test]
    fn foreign_urls_are_ignored_entirely() {
        let mut w = WidgetRecord::new();
        w.parse_payload(
            &payload_with_urls(&["https://example.com/x", "https://vk.com/app123"]),
            &registry(),
        );
        assert_eq!(w.result(), WidgetResult::Missing);
        assert!(w.links().is_empty());
    }

    #[test]
    fn all_valid_links_are_correct() {
        let mut w = WidgetRecord::new();
        w.parse_payload(&payload_with_urls(&[VALID_FORM, VALID_FORM]), &registry());
        assert_eq!(w.result(), WidgetResult::Correct);
        assert_eq!(w.links().len(), 2);
    }

    #[test]
    fn one_bad_link_makes_the_widget_invalid() {
        let bad = "https://pos.gosuslugi.ru/form/?opaId=123&utm_source=vk&utm_medium=45&utm_campaign=123";
        let mut w = WidgetRecord::new();
        w.parse_payload(&payload_with_urls(&[VALID_FORM, bad]), &registry());
        assert_eq!(w.result(), WidgetResult::Invalid);
    }

    #[test]
    fn count_check_precedes_validity() {
        // Three fully valid links against an expected count of two.
        let mut w = WidgetRecord::new();
        w.parse_payload(
            &payload_with_urls(&[VALID_FORM, VALID_FORM, VALID_FORM]),
            &registry_with_max(2),
        );
        assert_eq!(w.result(), WidgetResult::LinkCountMismatch);
    }

    #[test]
    fn zero_max_disables_the_count_check() {
        let mut w = WidgetRecord::new();
        w.parse_payload(
            &payload_with_urls(&[VALID_FORM, VALID_FORM, VALID_FORM]),
            &registry_with_max(0),
        );
        assert_eq!(w.result(), WidgetResult::Correct);
    }

    #[test]
    fn forced_timeout_survives_parse() {
        let mut w = WidgetRecord::new();
        w.force_result(WidgetResult::Timeout);
        w.parse_payload(&payload_with_urls(&[VALID_FORM]), &registry());
        assert_eq!(w.result(), WidgetResult::Timeout);
        assert!(w.links().is_empty());
    }

    #[test]
    fn links_keep_payload_order() {
        let bad = "https://pos.gosuslugi.ru/form/?opaId=x&utm_source=vk&utm_medium=45&utm_campaign=1234567890123";
        let mut w = WidgetRecord::new();
        w.parse_payload(&payload_with_urls(&[bad, VALID_FORM]), &registry());
        assert_eq!(w.links()[0].url, bad);
        assert_eq!(w.links()[1].url, VALID_FORM);
    }
}
