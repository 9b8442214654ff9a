//! # kt - kanban tracker CLI
//!
//! A small file-backed kanban tracker whose main job is the period summary
//! report: pick a project and a date range, and `kt report` writes a PDF (or
//! HTML) with the key figures for that period and the full task listing.
//!
//! ## Quick Start
//!
//! ```bash
//! kt user add "Ana" --email ana@example.com
//! kt project add "Website" --lead 1
//! kt add website "Landing page" --priority urgent --due 2024-01-31 --assignee 1 --label design
//! kt move website 1 in-progress
//! kt report website --from 2024-01-01 --to 2024-01-31
//! ```
//!
//! PDF output pipes the rendered XHTML through an HTML-to-PDF program
//! (`wkhtmltopdf` by default, see `--converter` / `KT_CONVERTER`). Use
//! `--format html` to write the markup itself.
//!
//! Data is stored in `~/.kt/kanban.json`; reports default to `~/.kt/reports/`.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanban_report::config::Config;
use kanban_report::db::Database;

pub mod cli;
pub mod cmd;

use cli::Cli;
use cmd::*;

fn init_tracing(verbose: bool) {
    let default = if verbose { "kanban_report=debug,kt=debug" } else { "kanban_report=info,kt=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CmdError> {
    // Commands that need neither the store nor the configuration.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return Ok(());
    }

    let (report_dir, converter) = match &cli.command {
        Commands::Report { report_dir, converter, .. } => (report_dir.clone(), converter.clone()),
        _ => (None, None),
    };
    let config = Config::from_env(cli.db, report_dir, converter);
    tracing::debug!(?config, "configuration resolved");

    let db_path = config.db_path.clone();
    let mut db = Database::load(&db_path)?;

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::User { action } => cmd_user(&mut db, &db_path, action),

        Commands::Project { action } => cmd_project(&mut db, &db_path, action),

        Commands::Add { project, title, desc, priority, due, assignee, labels } =>
            cmd_add(&mut db, &db_path, project, title, desc, priority, due, assignee, labels),

        Commands::Move { project, id, state } => cmd_move(&mut db, &db_path, project, id, state),

        Commands::Label { project, id, name, color, remove } =>
            cmd_label(&mut db, &db_path, project, id, name, color, remove),

        Commands::List { project } => cmd_list(&db, project),

        Commands::Report { project, from, to, out, format, print, .. } =>
            cmd_report(&db, &config, project, from, to, out, format, print),
    }
}
