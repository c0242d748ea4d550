use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] fred::error::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown entity type: {0}")]
    UnknownEntityKind(String),

    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("no source files found under {0}")]
    NoSourceFiles(String),
}

pub type Result<T> = std::result::Result<T, EngramError>;
