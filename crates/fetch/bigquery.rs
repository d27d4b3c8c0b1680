//! Query execution over the BigQuery v2 REST API.

use std::time::Duration;

use chrono::DateTime;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::credentials::{check, Credentials, PROJECT_ENV};
use crate::error::{FetchError, Result};

const API: &str = "https://bigquery.googleapis.com/bigquery/v2";
const PAGE_SIZE: u32 = 50_000;
const WAIT_MS: u32 = 10_000;

/// Column names and rows of a finished query, cells as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

pub trait QueryRunner {
    fn run(&self, sql: &str) -> Result<ResultTable>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    schema: Option<Schema>,
    job_reference: Option<JobReference>,
    page_token: Option<String>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Schema {
    fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
struct Field {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    v: Value,
}

/// Renders TIMESTAMP cells, sent as epoch seconds, in UTC with microseconds.
pub fn format_timestamp(seconds: &str) -> Option<String> {
    let micros = (seconds.parse::<f64>().ok()? * 1e6).round() as i64;
    let when = DateTime::from_timestamp_micros(micros)?;
    Some(when.format("%Y-%m-%d %H:%M:%S%.6f+00:00").to_string())
}

fn cell_text(kind: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if kind == "TIMESTAMP" => format_timestamp(s)
            .map(Some)
            .ok_or_else(|| FetchError::Response(format!("bad TIMESTAMP cell {:?}", s))),
        Value::String(s) => Ok(Some(s.clone())),
        other => Ok(Some(other.to_string())),
    }
}

impl ResultTable {
    fn append(&mut self, page: &QueryResponse) -> Result<()> {
        let Some(schema) = &page.schema else {
            return Err(FetchError::Response("completed job without schema".to_string()));
        };
        if self.columns.is_empty() {
            self.columns = schema.fields.iter().map(|f| f.name.clone()).collect();
        }
        for row in &page.rows {
            if row.f.len() != schema.fields.len() {
                return Err(FetchError::Response(format!(
                    "row has {} cells, schema has {} fields",
                    row.f.len(),
                    schema.fields.len()
                )));
            }
            let cells = schema
                .fields
                .iter()
                .zip(&row.f)
                .map(|(field, cell)| cell_text(&field.kind, &cell.v))
                .collect::<Result<Vec<_>>>()?;
            self.rows.push(cells);
        }
        Ok(())
    }
}

pub struct BigQuery {
    http: Client,
    project: String,
    token: String,
}

impl BigQuery {
    /// Authenticates with application-default credentials. The billing
    /// project is `project`, else `GOOGLE_CLOUD_PROJECT`, else the one named
    /// in the credentials.
    pub fn connect(project: Option<String>) -> Result<BigQuery> {
        let path = Credentials::locate()?;
        let credentials = Credentials::from_file(&path)?;
        let project = project
            .or_else(|| std::env::var(PROJECT_ENV).ok().filter(|p| !p.is_empty()))
            .or_else(|| credentials.project_id().map(str::to_string))
            .ok_or(FetchError::NoProject)?;
        let http = Client::builder().timeout(Duration::from_secs(120)).build()?;
        let token = credentials.access_token(&http)?;
        info!("authenticated with {}, billing project {}", path.display(), project);
        Ok(BigQuery {
            http,
            project,
            token,
        })
    }

    fn results(&self, reference: &JobReference, page_token: Option<&str>) -> Result<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            API, self.project, reference.job_id
        );
        let mut request = self.http.get(url).bearer_auth(&self.token).query(&[
            ("maxResults", PAGE_SIZE.to_string()),
            ("timeoutMs", WAIT_MS.to_string()),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        if let Some(location) = &reference.location {
            request = request.query(&[("location", location)]);
        }
        Ok(check(request.send()?)?.json()?)
    }
}

impl QueryRunner for BigQuery {
    fn run(&self, sql: &str) -> Result<ResultTable> {
        let url = format!("{}/projects/{}/queries", API, self.project);
        let body = json!({
            "query": sql,
            "useLegacySql": false,
            "maxResults": PAGE_SIZE,
            "timeoutMs": WAIT_MS,
        });
        let mut page: QueryResponse = check(
            self.http
                .post(url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()?,
        )?
        .json()?;

        let mut table = ResultTable::default();
        loop {
            if page.job_complete {
                table.append(&page)?;
                debug!("{} rows so far", table.rows.len());
                if page.page_token.is_none() {
                    break;
                }
            } else {
                info!("waiting for query job");
            }
            let reference = page
                .job_reference
                .as_ref()
                .ok_or_else(|| FetchError::Response("missing jobReference".to_string()))?;
            let token = if page.job_complete {
                page.page_token.as_deref()
            } else {
                None
            };
            page = self.results(reference, token)?;
        }
        Ok(table)
    }
}
