//! Conversion of rendered markup into the final artifact.
//!
//! A `Converter` turns markup into bytes written to a sink. `ExternalConverter`
//! pipes the markup through an HTML-to-PDF program found on `PATH`;
//! `MarkupConverter` writes the markup as is. `generate_artifact` drives the
//! whole pipeline and never leaves a partial file behind.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::ReportError;
use crate::report::document::ReportDocument;
use crate::report::render::{render_html, validate};

/// Default HTML-to-PDF program.
pub const DEFAULT_CONVERTER: &str = "wkhtmltopdf";

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{0} is not installed or not on PATH")]
    Unavailable(String),

    #[error("{0}")]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

/// Turns markup into a finished document.
pub trait Converter {
    fn name(&self) -> &str;

    /// Check that the conversion capability exists before any output is created.
    fn ensure_available(&self) -> Result<(), ConvertError> {
        Ok(())
    }

    fn convert(&self, markup: &str, sink: &mut dyn Write) -> Result<(), ConvertError>;
}

/// Writes the markup itself, producing an HTML artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupConverter;

impl Converter for MarkupConverter {
    fn name(&self) -> &str {
        "markup"
    }

    fn convert(&self, markup: &str, sink: &mut dyn Write) -> Result<(), ConvertError> {
        sink.write_all(markup.as_bytes())
            .map_err(|e| ConvertError::Failed(Box::new(e)))
    }
}

/// Pipes markup through an external program reading stdin and writing the
/// document to stdout.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
}

impl ExternalConverter {
    /// `program` with the stdin-to-stdout arguments `wkhtmltopdf` expects.
    pub fn new(program: impl Into<String>) -> Self {
        ExternalConverter {
            program: program.into(),
            args: vec!["--quiet".into(), "-".into(), "-".into()],
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn locate(&self) -> Result<PathBuf, ConvertError> {
        which::which(&self.program).map_err(|e| {
            tracing::debug!(program = %self.program, error = %e, "converter lookup failed");
            ConvertError::Unavailable(self.program.clone())
        })
    }
}

impl Default for ExternalConverter {
    fn default() -> Self {
        ExternalConverter::new(DEFAULT_CONVERTER)
    }
}

impl Converter for ExternalConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn ensure_available(&self) -> Result<(), ConvertError> {
        self.locate().map(|_| ())
    }

    fn convert(&self, markup: &str, sink: &mut dyn Write) -> Result<(), ConvertError> {
        let path = self.locate()?;
        tracing::debug!(program = %path.display(), args = ?self.args, "starting converter");

        let mut child = Command::new(&path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ConvertError::Unavailable(self.program.clone()),
                _ => ConvertError::Failed(Box::new(e)),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ConvertError::Failed("converter stdin was not captured".into()))?;

        // Feed stdin from a second thread while stdout and stderr are drained,
        // otherwise a large document can fill both pipes and stall.
        let (written, output) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(markup.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output.map_err(|e| ConvertError::Failed(Box::new(e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            let message = if detail.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                format!("{} exited with {}: {}", self.program, output.status, detail)
            };
            return Err(ConvertError::Failed(message.into()));
        }
        match written {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ConvertError::Failed(Box::new(e))),
            Err(_) => return Err(ConvertError::Failed("converter input thread panicked".into())),
        }
        if output.stdout.is_empty() {
            return Err(ConvertError::Failed(
                format!("{} produced no output", self.program).into(),
            ));
        }

        sink.write_all(&output.stdout)
            .map_err(|e| ConvertError::Failed(Box::new(e)))
    }
}

/// Guard over `<destination>.part`. Dropping it uncommitted deletes the
/// partial file.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn path_for(destination: &Path) -> PathBuf {
        let mut name: OsString = destination.as_os_str().to_owned();
        name.push(".part");
        PathBuf::from(name)
    }

    fn commit(mut self, destination: &Path) -> Result<(), ReportError> {
        fs::rename(&self.path, destination).map_err(|source| ReportError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove partial report");
        }
    }
}

/// Run `converter` into a freshly created partial file. The file handle is
/// closed when this returns, whatever the outcome.
fn write_partial(
    converter: &dyn Converter,
    markup: &str,
    destination: &Path,
) -> Result<PartialFile, ReportError> {
    let path = PartialFile::path_for(destination);
    let io_err = |source| ReportError::Io {
        path: PartialFile::path_for(destination),
        source,
    };
    let file = File::create(&path).map_err(io_err)?;
    let guard = PartialFile {
        path,
        committed: false,
    };

    let mut writer = BufWriter::new(file);
    converter
        .convert(markup, &mut writer)
        .map_err(into_report_error)?;
    let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_all().map_err(io_err)?;
    Ok(guard)
}

fn into_report_error(err: ConvertError) -> ReportError {
    match err {
        ConvertError::Unavailable(converter) => ReportError::ConverterUnavailable { converter },
        ConvertError::Failed(cause) => ReportError::RenderFailure {
            message: format!("failed to generate the report: {cause}"),
            source: cause,
        },
    }
}

/// Render `doc` and convert it into `destination`.
///
/// The converter's availability is checked before the filesystem is touched.
/// Output goes to `<destination>.part` and is renamed into place only after
/// the converter succeeds; on any failure the partial file is removed and an
/// existing file at `destination` is left as it was.
pub fn generate_artifact(
    doc: &ReportDocument,
    converter: &dyn Converter,
    destination: &Path,
) -> Result<PathBuf, ReportError> {
    if destination.as_os_str().is_empty() {
        return Err(ReportError::ContractViolation("report destination is empty".into()));
    }
    validate(doc)?;
    let markup = render_html(doc);

    converter.ensure_available().map_err(into_report_error)?;

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    write_partial(converter, &markup, destination)?.commit(destination)?;

    tracing::info!(
        converter = converter.name(),
        path = %destination.display(),
        bytes = markup.len(),
        "report written"
    );
    Ok(destination.to_path_buf())
}
