//! poslint-core
//!
//! The classification engine of the poslint auditor:
//! - channel resolution from `utm_source` values
//! - per-channel URL schemas with UTM parameter grammars
//! - the short-circuiting per-link validation pipeline
//! - widget-level verdict aggregation
//! - diagnostic rendering from externally supplied templates
//!
//! The engine is pure computation: no network, no filesystem, no clocks.
//! Higher-level crates fetch payloads and export results; they hand this
//! crate a payload value and read back records. All configuration is
//! compiled once into a [`schema::SchemaRegistry`] at startup, after which
//! every read path is safe for unsynchronized concurrent use.

pub mod channel;
pub mod config;
pub mod errors;
pub mod link;
pub mod param;
pub mod public;
pub mod render;
pub mod schema;
pub mod widget;

pub use crate::errors::{CoreError, CoreResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::channel::Channel;
    pub use crate::config::{DisplayConfig, EngineConfig};
    pub use crate::link::{validate_link, LinkRecord, LinkStatus};
    pub use crate::param::{ParamBinding, ParamCode, ParamSpec};
    pub use crate::public::Public;
    pub use crate::render::{render_param, render_params, result_text, status_text};
    pub use crate::schema::{LinkSchema, SchemaRegistry};
    pub use crate::widget::{aggregate, WidgetRecord, WidgetResult};
    pub use crate::{CoreError, CoreResult};
}
