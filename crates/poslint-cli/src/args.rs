use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "poslint", version, about = "Audit POS widget links in VK communities")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML).
    #[arg(long, global = true, default_value = "poslint.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Audit every community from a target list and export the results.
    Audit {
        /// File with one community URL per line.
        #[arg(long, default_value = "target.txt")]
        targets: String,

        /// Result file; the format follows the extension unless --format is set.
        #[arg(long, default_value = "result.csv")]
        out: String,

        /// Export format: csv|json|md
        #[arg(long)]
        format: Option<String>,

        /// Leave fully correct communities out of the export.
        #[arg(long)]
        skip_correct: bool,

        /// Directory to dump each community's raw payload as JSON.
        #[arg(long)]
        save_payloads: Option<String>,
    },

    /// Classify a single link offline and print its diagnostics.
    Check {
        url: String,
    },

    /// Run environment checks.
    Doctor,
}
