use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an extraction run. Everything else (missing fields,
/// ambiguous localities, nameless terminal blocks) is absorbed by the engine.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no pages found in {0}")]
    NoPages(PathBuf),
    #[error("page {index} out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
