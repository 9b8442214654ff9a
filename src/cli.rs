use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed kanban tracker with period summary reports.
/// Storage defaults to ~/.kt/kanban.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "kt", version, about = "Kanban tracker with PDF summary reports")]
pub struct Cli {
    /// Path to the JSON store file.
    #[arg(long, global = true, env = "KT_DB")]
    pub db: Option<PathBuf>,

    /// Log more detail to stderr (same as RUST_LOG=kanban_report=debug).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
