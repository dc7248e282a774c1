use anyhow::{Context, Result};
use serde::Serialize;
use termcolor::Color;

use poslint_core::prelude::*;

use crate::config::AppConfig;
use crate::output;

#[derive(Debug, Serialize)]
pub struct CheckOut {
    pub url: String,
    pub channel: String,
    pub status: String,
    pub status_text: String,
    pub params: Vec<String>,
}

pub async fn run(config_path: &str, url: &str) -> Result<()> {
    let app = AppConfig::load(config_path)?;
    let registry = SchemaRegistry::from_config(&app.parsing)
        .context("configuration rejected by the engine")?;

    let rec = validate_link(url, &registry);
    let out = CheckOut {
        url: rec.url.clone(),
        channel: rec.channel.literal().unwrap_or("undefined").to_string(),
        status: rec.status.key().to_string(),
        status_text: status_text(rec.status, registry.display()),
        params: rec
            .params
            .iter()
            .map(|b| render_param(b, registry.display()))
            .collect(),
    };

    if output::is_json() {
        return output::print(&out);
    }

    let color = if rec.status.is_valid() {
        Color::Green
    } else {
        Color::Red
    };
    output::colored_line(&out.status, &out.status_text, color)?;
    println!("channel: {}", out.channel);
    for line in &out.params {
        println!("  {line}");
    }
    Ok(())
}
