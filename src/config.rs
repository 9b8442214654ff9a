//! Runtime configuration.
//!
//! Each setting comes from a CLI flag, which clap also fills from its
//! environment variable (`KT_DB`, `KT_REPORT_DIR`, `KT_CONVERTER`), and
//! otherwise falls back to a default under `~/.kt/`.

use std::path::{Path, PathBuf};

use crate::calendar::CalendarDate;
use crate::fields::ReportFormat;
use crate::project::sanitize_project_name;
use crate::report::convert::DEFAULT_CONVERTER;

const DATA_DIR: &str = ".kt";
const STORE_FILE: &str = "kanban.json";
const REPORT_DIR: &str = "reports";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON store file.
    pub db_path: PathBuf,
    /// Directory default report destinations are placed in.
    pub report_dir: PathBuf,
    /// HTML-to-PDF program used for PDF reports.
    pub converter: String,
}

impl Config {
    /// Resolve settings against `home`, keeping any explicit override.
    pub fn new(
        home: &Path,
        db_path: Option<PathBuf>,
        report_dir: Option<PathBuf>,
        converter: Option<String>,
    ) -> Self {
        let data_dir = home.join(DATA_DIR);
        Config {
            db_path: db_path.unwrap_or_else(|| data_dir.join(STORE_FILE)),
            report_dir: report_dir.unwrap_or_else(|| data_dir.join(REPORT_DIR)),
            converter: converter
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONVERTER.to_string()),
        }
    }

    /// Resolve settings against `$HOME`, or the working directory when unset.
    pub fn from_env(db_path: Option<PathBuf>, report_dir: Option<PathBuf>, converter: Option<String>) -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Config::new(Path::new(&home), db_path, report_dir, converter)
    }

    /// Default destination: `<report_dir>/<project>_<from>_<to>.<ext>`.
    pub fn report_path(&self, project_name: &str, from: CalendarDate, to: CalendarDate, format: ReportFormat) -> PathBuf {
        let mut stem = sanitize_project_name(project_name);
        if stem.is_empty() {
            stem = "project".to_string();
        }
        self.report_dir
            .join(format!("{stem}_{from}_{to}.{}", format.extension()))
    }
}
