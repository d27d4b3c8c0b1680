pub mod bigquery;
pub mod credentials;
pub mod error;
pub mod output;
pub mod query;

use std::path::PathBuf;

use log::info;

pub use bigquery::{BigQuery, QueryRunner, ResultTable};
pub use error::{FetchError, Result};
pub use query::DateRange;

#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Fully qualified table id, wildcards allowed.
    pub table: String,
    pub range: DateRange,
    pub packages: Vec<String>,
    pub output: Option<PathBuf>,
}

/// Runs the download query and writes the rows to a CSV file, returning its
/// path.
pub fn fetch<R: QueryRunner>(runner: &R, request: &FetchRequest) -> Result<PathBuf> {
    let sql = query::build_query(&request.table, &request.range, &request.packages)?;
    let output = request
        .output
        .clone()
        .unwrap_or_else(|| request.range.default_output());
    info!(
        "querying {} from {} to {} for {} packages",
        request.table,
        request.range.from,
        request.range.to,
        request.packages.len()
    );
    let table = runner.run(&sql)?;
    info!("fetched {} rows", table.rows.len());
    output::write_csv(&output, &table)?;
    Ok(output)
}
