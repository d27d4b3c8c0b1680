//! Columns of a download row file.

use polars::prelude::*;

use crate::error::{FrameError, Result};

pub const TIMESTAMP: &str = "timestamp";
pub const FILE_PROJECT: &str = "file_project";
pub const FILE_VERSION: &str = "file_version";

pub const COLUMNS: [&str; 15] = [
    "timestamp",
    "country_code",
    "file_project",
    "file_version",
    "file_type",
    "details_installer_version",
    "details_python",
    "details_distro_name",
    "details_distro_version",
    "details_distro_libc_version",
    "details_system_name",
    "details_system_release",
    "details_cpu",
    "details_openssl_version",
    "details_setuptools_version",
];

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| *c == name)
}

/// Borrows a string column, failing with the column name when it is absent.
pub fn str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    if !has_column(df, name) {
        return Err(FrameError::UnknownColumn(name.to_string()));
    }
    Ok(df.column(name)?.str()?)
}
