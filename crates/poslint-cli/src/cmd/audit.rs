use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use termcolor::Color;

use poslint_core::prelude::*;
use poslint_vk::{VkClient, VkError};

use crate::config::AppConfig;
use crate::io::{export, input};
use crate::output;

const VK_BASE_URL: &str = "https://vk.com";

#[derive(Debug, Serialize)]
pub struct AuditOut {
    pub processed: usize,
    pub counters: BTreeMap<&'static str, usize>,
    pub out_file: String,
    pub format: &'static str,
    pub saved_payloads: Option<usize>,
}

pub async fn run(
    config_path: &str,
    targets_path: &str,
    out_path: &str,
    format: Option<&str>,
    skip_correct: bool,
    payload_dir: Option<&str>,
) -> Result<()> {
    let app = AppConfig::load(config_path)?;
    let registry = SchemaRegistry::from_config(&app.parsing)
        .context("configuration rejected by the engine")?;
    let format = export::ExportFormat::resolve(format, out_path)?;

    let targets = input::read_targets(targets_path)?;
    tracing::info!(count = targets.len(), "targets loaded");

    let client = VkClient::new(app.vk_client_config())
        .context("vk client not usable; set the access token in the config or POSLINT_VK_TOKEN")?;

    let mut publics: Vec<Public> = targets.iter().map(|u| Public::new(u.clone())).collect();
    let by_url: HashMap<String, usize> = publics
        .iter()
        .enumerate()
        .map(|(i, p)| (p.url().to_string(), i))
        .collect();

    let mut counters: BTreeMap<&'static str, usize> =
        WidgetResult::ALL.iter().map(|r| (r.key(), 0)).collect();

    let pb = ProgressBar::new(publics.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .expect("static progress template"),
    );

    let fields = app.request_fields();
    let batch = app.vk.batch_size.max(1);

    let mut start = 0;
    while start < publics.len() {
        let end = (start + batch).min(publics.len());
        let ids: Vec<String> = publics[start..end]
            .iter()
            .map(|p| p.identify().to_string())
            .collect();

        match client.groups_get_by_id(&ids, &fields).await {
            Ok(groups) => {
                for group in groups {
                    match find_public(&by_url, &group) {
                        Some(i) => {
                            publics[i].parse(group, &registry);
                        }
                        None => {
                            tracing::warn!(
                                screen_name = group.get("screen_name").and_then(serde_json::Value::as_str),
                                "fetched group matches no target"
                            );
                        }
                    }
                }
                // Targets absent from the response keep the default Error
                // verdict: the group is gone, renamed, or inaccessible.
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(error = %e, "batch unreachable after retries");
                for p in &mut publics[start..end] {
                    p.widget.force_result(WidgetResult::Timeout);
                }
            }
            Err(e @ VkError::Api { .. }) => {
                pb.abandon();
                bail!("vk api rejected the request: {e}");
            }
            Err(e) => {
                tracing::error!(error = %e, "batch failed");
                for p in &mut publics[start..end] {
                    p.widget.force_result(WidgetResult::Error);
                }
            }
        }

        for p in &publics[start..end] {
            *counters.entry(p.widget.result().key()).or_insert(0) += 1;
        }
        pb.inc((end - start) as u64);
        pb.set_message(counters_line(&counters));

        start = end;
    }
    pb.finish_and_clear();
    tracing::info!(?counters, "processing complete");

    let table = export::build_table(&publics, registry.display(), &app.export.fields, skip_correct);
    export::write_results(&table, format, out_path, app.export.csv_delimiter)?;

    let saved_payloads = match payload_dir {
        Some(dir) => Some(export::save_payloads(&publics, dir)?),
        None => None,
    };

    let out = AuditOut {
        processed: publics.len(),
        counters,
        out_file: out_path.to_string(),
        format: format.as_str(),
        saved_payloads,
    };

    if output::is_json() {
        return output::print(&out);
    }

    for (key, count) in &out.counters {
        output::colored_line(key, &count.to_string(), counter_color(key))?;
    }
    println!("Processing complete! See results in {out_path}");
    Ok(())
}

/// Match one fetched group payload back to its target by club id, public id,
/// or screen name.
fn find_public(by_url: &HashMap<String, usize>, group: &Value) -> Option<usize> {
    if let Some(id) = group.get("id").and_then(Value::as_i64) {
        for prefix in ["club", "public"] {
            if let Some(i) = by_url.get(&format!("{VK_BASE_URL}/{prefix}{id}")) {
                return Some(*i);
            }
        }
    }
    if let Some(name) = group.get("screen_name").and_then(Value::as_str) {
        if let Some(i) = by_url.get(&format!("{VK_BASE_URL}/{name}")) {
            return Some(*i);
        }
    }
    None
}

fn counters_line(counters: &BTreeMap<&'static str, usize>) -> String {
    counters
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn counter_color(key: &str) -> Color {
    match key {
        "CORRECT" => Color::Green,
        "INVALID" | "ERROR" => Color::Red,
        "TIMEOUT" => Color::Magenta,
        _ => Color::Yellow,
    }
}
