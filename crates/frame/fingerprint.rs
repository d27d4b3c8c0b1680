//! Approximates "one distinct install environment" from a handful of columns.
//!
//! The fingerprint is the tuple of [`FINGERPRINT_COLUMNS`]. Its version field
//! is snapshotted by [`mark`] before versions are folded, so rows that only
//! share a major.minor version stay distinct.

use polars::prelude::*;

use crate::error::Result;
use crate::schema::FILE_VERSION;

pub const FINGERPRINT_COLUMNS: [&str; 7] = [
    "file_project",
    "file_version",
    "country_code",
    "details_distro_name",
    "details_distro_version",
    "details_system_name",
    "details_system_release",
];

/// Holds the full version while `file_version` may be folded.
pub const FULL_VERSION: &str = "__fingerprint_version";

/// Copies the current `file_version` into the fingerprint.
pub fn mark(df: &mut DataFrame) -> Result<()> {
    let full = df.column(FILE_VERSION)?.clone().with_name(FULL_VERSION);
    df.with_column(full)?;
    Ok(())
}

fn subset(df: &DataFrame) -> Vec<String> {
    let marked = df.get_column_names().iter().any(|c| *c == FULL_VERSION);
    FINGERPRINT_COLUMNS
        .iter()
        .map(|c| match *c {
            FILE_VERSION if marked => FULL_VERSION.to_string(),
            other => other.to_string(),
        })
        .collect()
}

/// Keeps the first row of every fingerprint, in row order.
pub fn dedup(df: DataFrame) -> Result<DataFrame> {
    let subset = subset(&df);
    Ok(df
        .lazy()
        .unique_stable(Some(subset), UniqueKeepStrategy::First)
        .collect()?)
}

/// Drops the snapshot taken by [`mark`], if any.
pub fn unmark(df: DataFrame) -> Result<DataFrame> {
    if !df.get_column_names().iter().any(|c| *c == FULL_VERSION) {
        return Ok(df);
    }
    Ok(df.drop(FULL_VERSION)?)
}
