use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod config;
mod io;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = args::Cli::parse();
    output::init(cli.json);
    init_tracing();

    cmd::dispatch(cli).await
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
