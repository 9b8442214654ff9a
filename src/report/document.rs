//! Presentation-agnostic report structure.
//!
//! A `ReportDocument` carries a title, ordered metadata pairs and ordered
//! tables of pre-formatted text. It knows nothing about tasks or projects, so
//! the renderer can consume it without importing domain types.

/// A named table: column headers plus rows of already formatted cells.
///
/// Producers must give every row as many cells as there are columns; the
/// renderer rejects documents that break this.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReportTable {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportDocument {
    title: String,
    metadata: Vec<(String, String)>,
    tables: Vec<ReportTable>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        ReportDocument {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Insert a metadata pair. A repeated key keeps its original position and
    /// takes the new value.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.metadata.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.metadata.push((key, value)),
        }
    }

    /// Append a table. Tables with the same name are kept side by side.
    pub fn add_table(&mut self, table: ReportTable) {
        self.tables.push(table);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tables(&self) -> &[ReportTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}
