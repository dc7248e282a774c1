//! Error types for poslint-core.
//!
//! The classification path itself is total: every link and every payload maps
//! to a terminal [`crate::link::LinkStatus`] / [`crate::widget::WidgetResult`]
//! and never returns an error. `CoreError` only surfaces configuration
//! defects (an uncompilable grammar or an inconsistent config), which are
//! detected once, when the schema registry is built at startup.

use thiserror::Error;

/// Result alias used across poslint-core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Startup-time configuration errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configured grammar or template failed to compile.
    #[error("invalid pattern for {name}: {reason}")]
    Pattern { name: String, reason: String },

    /// A configuration value is structurally invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    pub fn pattern(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pattern {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_error_names_offender() {
        let e = CoreError::pattern("OGRN", "unbalanced paren");
        assert!(e.to_string().contains("OGRN"));
        assert!(e.to_string().contains("unbalanced paren"));
    }
}
