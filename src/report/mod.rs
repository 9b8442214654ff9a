//! Reporting pipeline: summary → document → markup → artifact.

pub mod convert;
pub mod document;
pub mod render;
pub mod summary;

pub use convert::{generate_artifact, ConvertError, Converter, ExternalConverter, MarkupConverter};
pub use document::{ReportDocument, ReportTable};
pub use render::{escape_html, render_html};
pub use summary::{build_summary, DateWindow, Kpis};
