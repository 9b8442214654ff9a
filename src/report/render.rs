//! Markup rendering of a `ReportDocument`.
//!
//! The output is a self-contained XHTML 1.0 Strict document with one embedded
//! stylesheet, so a converter never has to fetch anything. Rendering is pure:
//! the same document always yields the same bytes.

use crate::error::ReportError;
use crate::report::document::{ReportDocument, ReportTable};

const STYLESHEET: &str = "\
body { font-family: Arial, Helvetica, sans-serif; margin: 20px; }
h1 { color: #333; }
.meta { margin-bottom: 20px; }
table { width: 100%; border-collapse: collapse; margin-bottom: 20px; }
th, td { border: 1px solid #ddd; padding: 8px; font-size: 12px; }
th { background: #f4f4f4; text-align: left; }
";

/// Escape the five markup-unsafe characters. `&` goes first so entities
/// produced by the later substitutions are not escaped twice.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Reject documents no producer should hand to the renderer.
pub fn validate(doc: &ReportDocument) -> Result<(), ReportError> {
    if doc.title().trim().is_empty() {
        return Err(ReportError::ContractViolation("report title is empty".into()));
    }
    for table in doc.tables() {
        let width = table.columns().len();
        if let Some((idx, row)) = table.rows().iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ReportError::ContractViolation(format!(
                "table '{}' row {} has {} cells, expected {}",
                table.name(),
                idx + 1,
                row.len(),
                width
            )));
        }
    }
    Ok(())
}

/// Render `doc` to markup text.
pub fn render_html(doc: &ReportDocument) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
         \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n",
    );
    out.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n");
    out.push_str("<head>\n");
    out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\" />\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(doc.title())));
    out.push_str("<style type=\"text/css\">\n");
    out.push_str(STYLESHEET);
    out.push_str("</style>\n</head>\n<body>\n");

    out.push_str(&format!("<h1>{}</h1>\n", escape_html(doc.title())));
    out.push_str("<div class=\"meta\">\n");
    for (key, value) in doc.metadata() {
        out.push_str(&format!(
            "<div><strong>{}:</strong> {}</div>\n",
            escape_html(key),
            escape_html(value)
        ));
    }
    out.push_str("</div>\n");

    for table in doc.tables() {
        render_table(&mut out, table);
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_table(out: &mut String, table: &ReportTable) {
    let name = escape_html(table.name());
    out.push_str(&format!("<h2>{name}</h2>\n"));
    out.push_str(&format!("<table summary=\"{name}\">\n<thead>\n<tr>\n"));
    for col in table.columns() {
        out.push_str(&format!("<th scope=\"col\">{}</th>\n", escape_html(col)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in table.rows() {
        out.push_str("<tr>\n");
        for cell in row {
            out.push_str(&format!("<td>{}</td>\n", escape_html(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
}
