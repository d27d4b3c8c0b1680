use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}: missing column {column:?}")]
    MissingColumn { path: PathBuf, column: String },
    #[error("unknown column {0:?}")]
    UnknownColumn(String),
    #[error("{path}: cannot parse timestamp {value:?}")]
    Timestamp { path: PathBuf, value: String },
    #[error("package(s) not in the package list: {}", .0.join(", "))]
    UnknownPackage(Vec<String>),
    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
