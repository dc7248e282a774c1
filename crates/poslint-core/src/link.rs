//! The per-link validation pipeline.
//!
//! [`validate_link`] classifies one raw URL into exactly one terminal
//! [`LinkStatus`]. The pipeline short-circuits top to bottom:
//!
//! 1. resolve the channel from `utm_source` and look up its schema
//! 2. path equality (decoded, slash-stripped); mismatch is `Undefined`
//! 3. parameter grammars; any invalid binding is `UtmInvalid`
//! 4. whitespace search over the raw URL, yielding `Spacer`
//! 5. full-template match over the raw URL, yielding `NotMatch`
//! 6. otherwise `Valid`
//!
//! Step 5 re-covers ground already checked by steps 2–4 through an
//! independently authored pattern; it additionally pins parameter order and
//! separator literals, so it must not be collapsed into the earlier steps.
//!
//! The pipeline is a pure function of (URL, registry): no I/O, no retries,
//! no panic on any input. A string that does not parse as an absolute URL
//! classifies like a path mismatch.

use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::Url;

use crate::channel::Channel;
use crate::param::{ParamBinding, ParamSpec};
use crate::schema::SchemaRegistry;

/// Terminal classification of a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkStatus {
    /// Every check passed.
    Valid,
    /// The raw URL failed the composed template cross-check.
    NotMatch,
    /// At least one bound parameter failed its grammar.
    UtmInvalid,
    /// The raw URL contains whitespace or an escaped space.
    Spacer,
    /// Wrong path, unrecognized channel, or unparseable URL.
    Undefined,
}

impl LinkStatus {
    /// Stable key used for display-text lookup and export.
    pub fn key(&self) -> &'static str {
        match self {
            LinkStatus::Valid => "VALID",
            LinkStatus::NotMatch => "NOT_MATCH",
            LinkStatus::UtmInvalid => "UTM_INVALID",
            LinkStatus::Spacer => "SPACER",
            LinkStatus::Undefined => "UNDEFINED",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, LinkStatus::Valid)
    }
}

/// One audited link: URL, resolved channel, terminal status, and the
/// parameter bindings that were in play when the status was decided.
///
/// Immutable once produced; owned by the widget record that discovered it.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub channel: Channel,
    pub status: LinkStatus,
    pub params: Vec<ParamBinding>,
}

/// Classify one raw link URL against the registry.
pub fn validate_link(raw_url: &str, registry: &SchemaRegistry) -> LinkRecord {
    let Some((path, query)) = split_url(raw_url) else {
        return LinkRecord {
            url: raw_url.to_string(),
            channel: Channel::Undefined,
            status: LinkStatus::Undefined,
            params: Vec::new(),
        };
    };

    let channel = Channel::resolve(first_value(&query, "utm_source"));
    let schema = registry.schema(channel);

    if !schema.matches_path(&path) {
        // Required slots are reported unbound so diagnostics still list them.
        let params = schema.params().iter().map(|s| s.bind(None)).collect();
        return LinkRecord {
            url: raw_url.to_string(),
            channel,
            status: LinkStatus::Undefined,
            params,
        };
    }

    // Required slots in schema order, then extraneous parameters in query
    // order under the catch-all code (never valid).
    let mut params: Vec<ParamBinding> = schema
        .params()
        .iter()
        .map(|s| s.bind(first_value(&query, s.name())))
        .collect();
    for (name, value) in &query {
        if schema.param(name).is_none() {
            params.push(ParamSpec::undefined(name.clone()).bind(Some(value)));
        }
    }

    let status = if !params.iter().all(|b| b.valid) {
        LinkStatus::UtmInvalid
    } else if registry.has_whitespace(raw_url) {
        LinkStatus::Spacer
    } else if !registry.matches_template(raw_url) {
        LinkStatus::NotMatch
    } else {
        LinkStatus::Valid
    };

    LinkRecord {
        url: raw_url.to_string(),
        channel,
        status,
        params,
    }
}

/// Decompose a URL into its decoded slash-stripped path and its query pairs.
///
/// Query pairs keep first-occurrence order; a repeated name keeps its first
/// value. Returns `None` when the input is not an absolute URL.
fn split_url(raw_url: &str) -> Option<(String, Vec<(String, String)>)> {
    let url = Url::parse(raw_url).ok()?;

    let path = percent_decode_str(url.path())
        .decode_utf8_lossy()
        .trim_matches('/')
        .to_string();

    let mut query: Vec<(String, String)> = Vec::new();
    for (name, value) in url.query_pairs() {
        if !query.iter().any(|(n, _)| *n == *name) {
            query.push((name.into_owned(), value.into_owned()));
        }
    }

    Some((path, query))
}

fn first_value<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}
