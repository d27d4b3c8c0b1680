//! Application-default credentials and OAuth access tokens.

use std::path::{Path, PathBuf};

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

const SCOPE: &str = "https://www.googleapis.com/auth/bigquery.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Points application-default resolution at `path`.
pub fn install(path: &Path) {
    std::env::set_var(CREDENTIALS_ENV, path);
    info!("using credentials {}", path.display());
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub quota_project_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    ServiceAccount(ServiceAccount),
    AuthorizedUser(AuthorizedUser),
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The env var wins, then the gcloud well-known file if it exists.
fn locate_in(env: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return Some(path);
    }
    home.map(|h| h.join(".config/gcloud/application_default_credentials.json"))
        .filter(|p| p.exists())
}

/// Fails with the response body when the status is not a success.
pub(crate) fn check(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(FetchError::Api {
        status: status.as_u16(),
        message,
    })
}

impl Credentials {
    pub fn locate() -> Result<PathBuf> {
        locate_in(
            std::env::var_os(CREDENTIALS_ENV).map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
        .ok_or(FetchError::NoCredentials)
    }

    pub fn from_file(path: &Path) -> Result<Credentials> {
        let content = std::fs::read_to_string(path).map_err(|source| FetchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| FetchError::Credentials {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            Credentials::ServiceAccount(sa) => sa.project_id.as_deref(),
            Credentials::AuthorizedUser(user) => user.quota_project_id.as_deref(),
        }
    }

    /// Exchanges the credentials for a bearer token.
    pub fn access_token(&self, http: &Client) -> Result<String> {
        let request = match self {
            Credentials::ServiceAccount(sa) => {
                let now = Utc::now().timestamp();
                let claims = Claims {
                    iss: &sa.client_email,
                    scope: SCOPE,
                    aud: &sa.token_uri,
                    iat: now,
                    exp: now + 3600,
                };
                let key = EncodingKey::from_rsa_pem(sa.private_key.as_bytes())?;
                let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)?;
                http.post(&sa.token_uri)
                    .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            }
            Credentials::AuthorizedUser(user) => http.post(DEFAULT_TOKEN_URI).form(&[
                ("grant_type", "refresh_token"),
                ("client_id", user.client_id.as_str()),
                ("client_secret", user.client_secret.as_str()),
                ("refresh_token", user.refresh_token.as_str()),
            ]),
        };
        let token: TokenResponse = check(request.send()?)?.json()?;
        Ok(token.access_token)
    }
}
