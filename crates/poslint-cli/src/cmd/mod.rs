use anyhow::Result;

use crate::args::{Cli, Command};

mod audit;
mod check;
mod doctor;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Audit {
            targets,
            out,
            format,
            skip_correct,
            save_payloads,
        } => {
            audit::run(
                &cli.config,
                &targets,
                &out,
                format.as_deref(),
                skip_correct,
                save_payloads.as_deref(),
            )
            .await
        }
        Command::Check { url } => check::run(&cli.config, &url).await,
        Command::Doctor => doctor::run(&cli.config).await,
    }
}
