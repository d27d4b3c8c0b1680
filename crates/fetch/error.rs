use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid date {0:?}, expected YYYYMMDD")]
    Date(String),
    #[error("empty date range: {from} is after {to}")]
    Range { from: String, to: String },
    #[error("refusing to query invalid {what} {value:?}")]
    Invalid { what: &'static str, value: String },
    #[error("no credentials found, pass --credentials or set GOOGLE_APPLICATION_CREDENTIALS")]
    NoCredentials,
    #[error("no billing project, pass --project or set GOOGLE_CLOUD_PROJECT")]
    NoProject,
    #[error("cannot read credentials {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid credentials {path}: {source}")]
    Credentials {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Response(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, FetchError>;
