use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: required column '{column}' is missing", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}:{line}: invalid {column} value '{value}'", path.display())]
    InvalidNumber {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("invalid scene metadata in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scene {} has no points to center on", path.display())]
    EmptyScene { path: PathBuf },
}
