//! Error types for the store and the reporting pipeline.

use std::path::PathBuf;

/// Failures while producing a report artifact.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The document converter is missing from this environment.
    #[error("document converter '{converter}' is not available")]
    ConverterUnavailable { converter: String },

    /// The converter ran but could not produce the artifact.
    #[error("{message}")]
    RenderFailure {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A caller handed the pipeline input it must never produce.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("cannot write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while loading, saving or querying the task store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot access store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("multiple {entity}s match '{key}': {candidates}. Please use the id instead")]
    Ambiguous {
        entity: &'static str,
        key: String,
        candidates: String,
    },

    #[error("invalid data: {0}")]
    Invalid(String),
}
