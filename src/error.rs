//! Error types for the token compiler

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Missing required key '{key}' in {file}")]
    MissingKey { file: String, key: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("{count} unresolved token reference(s): {}", paths.join(", "))]
    UnresolvedReferences { count: usize, paths: Vec<String> },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Watch error: {message}")]
    Watch { message: String },

    #[error("Config error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl TokenError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn missing_key(file: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingKey {
            file: file.into(),
            key: key.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn watch(message: impl Into<String>) -> Self {
        Self::Watch {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors that mean the input could not be read at all
    pub fn is_input_missing(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}
