use anyhow::Result;
use serde::Serialize;

use poslint_core::schema::SchemaRegistry;

use crate::config::AppConfig;
use crate::output;

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorOut {
    pub ok: bool,
    pub checks: Vec<Check>,
}

pub async fn run(config_path: &str) -> Result<()> {
    let mut checks = Vec::new();

    let app = match AppConfig::load(config_path) {
        Ok(app) => {
            checks.push(Check {
                name: "config".to_string(),
                ok: true,
                detail: format!("loaded from {config_path} (or defaults)"),
            });
            Some(app)
        }
        Err(e) => {
            checks.push(Check {
                name: "config".to_string(),
                ok: false,
                detail: e.to_string(),
            });
            None
        }
    };

    if let Some(app) = &app {
        match SchemaRegistry::from_config(&app.parsing) {
            Ok(_) => checks.push(Check {
                name: "engine".to_string(),
                ok: true,
                detail: "all grammars and templates compile".to_string(),
            }),
            Err(e) => checks.push(Check {
                name: "engine".to_string(),
                ok: false,
                detail: e.to_string(),
            }),
        }

        checks.push(Check {
            name: "vk_token".to_string(),
            ok: app.access_token().is_some(),
            detail: "optional (required for audit)".to_string(),
        });
    }

    // The token is optional; everything else must pass.
    let ok = checks.iter().all(|c| c.ok || c.name == "vk_token");
    output::print(&DoctorOut { ok, checks })?;
    Ok(())
}
