//! Diagnostic rendering.
//!
//! Pure string formatting against externally supplied templates: identity
//! enums never carry display text, and nothing here affects classification.
//! Unknown keys fall back to their stable key so partial display overrides
//! stay harmless.

use crate::config::DisplayConfig;
use crate::link::{LinkRecord, LinkStatus};
use crate::param::ParamBinding;
use crate::widget::WidgetResult;

/// Render one parameter binding with the configured line template.
pub fn render_param(binding: &ParamBinding, display: &DisplayConfig) -> String {
    let code = binding.code.key();
    let hint = display
        .param_hints
        .get(code)
        .cloned()
        .unwrap_or_else(|| code.to_string());

    subst(
        &display.param_line,
        &[
            ("code", code.to_string()),
            ("param", binding.param.clone()),
            (
                "pattern",
                binding.pattern.clone().unwrap_or_else(|| "none".to_string()),
            ),
            (
                "value",
                binding.value.clone().unwrap_or_else(|| "none".to_string()),
            ),
            ("hint", hint),
            ("valid", binding.valid.to_string()),
        ],
    )
}

/// Render all of a link's parameter diagnostics, one line per binding.
pub fn render_params(record: &LinkRecord, display: &DisplayConfig) -> String {
    record
        .params
        .iter()
        .map(|b| render_param(b, display))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human text for a link status.
pub fn status_text(status: LinkStatus, display: &DisplayConfig) -> String {
    display
        .status_text
        .get(status.key())
        .cloned()
        .unwrap_or_else(|| status.key().to_string())
}

/// Human text for a widget verdict.
pub fn result_text(result: WidgetResult, display: &DisplayConfig) -> String {
    display
        .result_text
        .get(result.key())
        .cloned()
        .unwrap_or_else(|| result.key().to_string())
}

/// Replace `{name}` placeholders. Placeholders without a substitution are
/// left as-is.
fn subst(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
