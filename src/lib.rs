//! # kanban_report
//!
//! A file-backed kanban tracker whose core is a period summary report.
//!
//! Given a project and an inclusive `[from, to]` date range, the reporting
//! pipeline computes a set of key figures over the project's tasks, assembles
//! them into a presentation-agnostic [`report::ReportDocument`], renders that
//! to self-contained XHTML and hands it to a [`report::Converter`] that
//! produces the final artifact (a PDF through an external program, or the
//! HTML itself).
//!
//! ```no_run
//! use kanban_report::calendar::CalendarDate;
//! use kanban_report::db::Database;
//! use kanban_report::report::{build_summary, generate_artifact, ExternalConverter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::load(std::path::Path::new("kanban.json"))?;
//! let project = db.project("website")?;
//! let from = CalendarDate::new(1, 1, 2024)?;
//! let to = CalendarDate::new(31, 1, 2024)?;
//! let doc = build_summary(project, &db.users, from, to);
//! generate_artifact(&doc, &ExternalConverter::default(), "reports/website.pdf".as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod fields;
pub mod project;
pub mod report;
pub mod task;
