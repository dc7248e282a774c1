//! UTM parameter codes, grammars, and bindings.
//!
//! A [`ParamCode`] identifies the semantic role of a query parameter; it
//! carries identity only. The value grammar is compiled into a [`ParamSpec`]
//! when the schema registry is built, and a [`ParamBinding`] is produced by
//! the pure factory [`ParamSpec::bind`]: validity is computed exactly once,
//! as a function of (grammar, value), with no later recomputation.

use regex::Regex;
use serde::Serialize;

use crate::channel::Channel;
use crate::errors::{CoreError, CoreResult};

/// Semantic role of a UTM query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParamCode {
    /// Numeric form identifier (`opaId`).
    OpaId,
    /// 2-digit region code, or one of the reserved literals 111/711/7114.
    RegCode,
    /// 8-digit municipal code.
    MunCode,
    /// 13-digit registry number.
    Ogrn,
    /// The channel literal itself (`utm_source`).
    Source,
    /// Catch-all for parameters outside the schema; never valid.
    Undefined,
}

impl ParamCode {
    /// Stable key used for grammar overrides and hint lookup.
    pub fn key(&self) -> &'static str {
        match self {
            ParamCode::OpaId => "ID",
            ParamCode::RegCode => "REG-CODE",
            ParamCode::MunCode => "MUN-CODE",
            ParamCode::Ogrn => "OGRN",
            ParamCode::Source => "SOURCE",
            ParamCode::Undefined => "UNDEFINED",
        }
    }

    /// Built-in grammar for this code.
    ///
    /// The `Source` grammar is the channel literal; `Undefined` has no
    /// grammar and therefore never validates.
    pub fn default_pattern(&self, channel: Channel) -> Option<String> {
        match self {
            ParamCode::OpaId => Some(r"\d+".to_string()),
            ParamCode::RegCode => Some(r"\d{2}|111|711|7114".to_string()),
            ParamCode::MunCode => Some(r"\d{8}".to_string()),
            ParamCode::Ogrn => Some(r"\d{13}".to_string()),
            ParamCode::Source => channel.literal().map(str::to_string),
            ParamCode::Undefined => None,
        }
    }
}

/// Compile a grammar with full-string match semantics.
///
/// Grammars are authored as bare patterns; the whole value must conform, so
/// the pattern is anchored here rather than relying on search semantics.
pub(crate) fn compile_fullmatch(name: &str, pattern: &str) -> CoreResult<Regex> {
    Regex::new(&format!(r"\A(?:{pattern})\z"))
        .map_err(|e| CoreError::pattern(name, e.to_string()))
}

/// A named parameter slot with its compiled grammar.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    code: ParamCode,
    /// Grammar as configured, kept for diagnostics.
    pattern_source: Option<String>,
    pattern: Option<Regex>,
}

impl ParamSpec {
    /// Build a spec from a grammar pattern. Fails only on an uncompilable
    /// pattern, which is a startup-time configuration defect.
    pub fn new(name: impl Into<String>, code: ParamCode, pattern: Option<String>) -> CoreResult<Self> {
        let name = name.into();
        let compiled = match &pattern {
            Some(p) => Some(compile_fullmatch(&name, p)?),
            None => None,
        };
        Ok(Self {
            name,
            code,
            pattern_source: pattern,
            pattern: compiled,
        })
    }

    /// The catch-all spec for a query parameter outside the schema.
    pub fn undefined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: ParamCode::Undefined,
            pattern_source: None,
            pattern: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> ParamCode {
        self.code
    }

    /// Bind a raw query value, computing validity once.
    ///
    /// An absent value is always invalid, as is any value for a spec without
    /// a grammar.
    pub fn bind(&self, value: Option<&str>) -> ParamBinding {
        let valid = match (&self.pattern, value) {
            (Some(re), Some(v)) => re.is_match(v),
            _ => false,
        };
        ParamBinding {
            param: self.name.clone(),
            code: self.code,
            pattern: self.pattern_source.clone(),
            value: value.map(str::to_string),
            valid,
        }
    }
}

/// An immutable (parameter, value, validity) binding.
#[derive(Debug, Clone, Serialize)]
pub struct ParamBinding {
    pub param: String,
    pub code: ParamCode,
    pub pattern: Option<String>,
    pub value: Option<String>,
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(code: ParamCode) -> ParamSpec {
        ParamSpec::new("p", code, code.default_pattern(Channel::Vk)).unwrap()
    }

    #[test]
    fn opa_id_accepts_digits_only() {
        let s = spec(ParamCode::OpaId);
        assert!(s.bind(Some("123")).valid);
        assert!(!s.bind(Some("12a")).valid);
        assert!(!s.bind(Some("")).valid);
        assert!(!s.bind(None).valid);
    }

    #[test]
    fn reg_code_accepts_reserved_literals() {
        let s = spec(ParamCode::RegCode);
        for ok in ["45", "111", "711", "7114"] {
            assert!(s.bind(Some(ok)).valid, "{ok} should be valid");
        }
        for bad in ["4", "456", "1111", "7115"] {
            assert!(!s.bind(Some(bad)).valid, "{bad} should be invalid");
        }
    }

    #[test]
    fn ogrn_requires_exactly_13_digits() {
        let s = spec(ParamCode::Ogrn);
        assert!(s.bind(Some("1234567890123")).valid);
        assert!(!s.bind(Some("123")).valid);
        assert!(!s.bind(Some("12345678901234")).valid);
    }

    #[test]
    fn source_matches_channel_literal() {
        let s = ParamSpec::new(
            "utm_source",
            ParamCode::Source,
            ParamCode::Source.default_pattern(Channel::Vk1),
        )
        .unwrap();
        assert!(s.bind(Some("vk1")).valid);
        assert!(!s.bind(Some("vk")).valid);
    }

    #[test]
    fn undefined_code_never_validates() {
        let s = ParamSpec::undefined("custom");
        assert!(!s.bind(Some("anything")).valid);
        assert!(!s.bind(None).valid);
    }

    #[test]
    fn grammar_is_full_match_not_search() {
        let s = spec(ParamCode::MunCode);
        assert!(s.bind(Some("12345678")).valid);
        assert!(!s.bind(Some("x12345678")).valid);
        assert!(!s.bind(Some("123456789")).valid);
    }

    #[test]
    fn bad_override_is_a_startup_error() {
        let err = ParamSpec::new("p", ParamCode::OpaId, Some("(".to_string())).unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
    }
}
