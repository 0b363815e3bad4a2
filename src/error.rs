use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqueezeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote compression failed: {message}")]
    Remote { message: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(PathBuf),

    #[error("Unknown file kind: {0}")]
    UnknownKind(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Walkdir error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl SqueezeError {
    /// Maps a stat/open failure on `path` onto `NotFound` or `Io`.
    pub fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SqueezeError::NotFound(path.to_path_buf())
        } else {
            SqueezeError::Io(err)
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        SqueezeError::Remote {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for SqueezeError {
    fn from(err: reqwest::Error) -> Self {
        SqueezeError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SqueezeError>;
