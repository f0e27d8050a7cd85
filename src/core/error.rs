//! Error types for esmigrate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using esmigrate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// esmigrate error types
///
/// Graph-level problems (duplicate or unresolved namespaces) are validated
/// in batch after the reader pass; everything else aborts the run where it
/// occurs. There is no retry path — the tool is a one-shot batch transform.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input dir not found: {}", .path.display())]
    InputDirNotFound { path: PathBuf },

    #[error(
        "Namespace {namespace} is already provided by more than one file: {}, {}",
        .second.display(),
        .first.display()
    )]
    DuplicateProvide {
        namespace: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Dependencies not found: {}", .namespaces.join(", "))]
    UnresolvedDependencies { namespaces: Vec<String> },

    #[error("Namespace '{namespace}' is provided as a module, but no exports were found")]
    MissingModuleExports { namespace: String },

    #[error("Found multiple member imports in '{text}', which is unsupported")]
    UnsupportedDestructuredImport { text: String },

    #[error("Did not find statement end in: {context}")]
    ScannerOverrun { context: String },

    #[error("Required namespace {namespace} could not be resolved to a file")]
    NamespaceNotProvided { namespace: String },

    #[error("Could not allocate a collision-free alias for {namespace}")]
    AliasAllocationFailed { namespace: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
