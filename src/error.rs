//! Error types for the build pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, transforming or writing documents
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid front-matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("Directive '{name}' failed: {message}")]
    Directive { name: String, message: String },

    #[error("Transformer '{name}' failed: {message}")]
    Transform { name: &'static str, message: String },

    #[error("Highlighting failed: {0}")]
    Highlight(String),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn directive(name: &str, message: impl Into<String>) -> Self {
        BuildError::Directive {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
