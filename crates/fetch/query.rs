//! The download query.

use std::path::PathBuf;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{FetchError, Result};

const DAY_FORMAT: &str = "%Y%m%d";

/// Selected fields and the column names they are written under.
pub const FIELDS: [(&str, &str); 15] = [
    ("timestamp", "timestamp"),
    ("country_code", "country_code"),
    ("file.project", "file_project"),
    ("file.version", "file_version"),
    ("file.type", "file_type"),
    ("details.installer.version", "details_installer_version"),
    ("details.python", "details_python"),
    ("details.distro.name", "details_distro_name"),
    ("details.distro.version", "details_distro_version"),
    ("details.distro.libc.version", "details_distro_libc_version"),
    ("details.system.name", "details_system_name"),
    ("details.system.release", "details_system_release"),
    ("details.cpu", "details_cpu"),
    ("details.openssl_version", "details_openssl_version"),
    ("details.setuptools_version", "details_setuptools_version"),
];

/// Inclusive range of daily table suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub fn parse_day(s: &str) -> Result<NaiveDate> {
    if s.len() != 8 {
        return Err(FetchError::Date(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DAY_FORMAT).map_err(|_| FetchError::Date(s.to_string()))
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(FetchError::Range {
                from: from.format(DAY_FORMAT).to_string(),
                to: to.format(DAY_FORMAT).to_string(),
            });
        }
        Ok(DateRange { from, to })
    }

    pub fn parse(from: &str, to: &str) -> Result<Self> {
        DateRange::new(parse_day(from)?, parse_day(to)?)
    }

    pub fn suffixes(&self) -> (String, String) {
        (
            self.from.format(DAY_FORMAT).to_string(),
            self.to.format(DAY_FORMAT).to_string(),
        )
    }

    pub fn default_output(&self) -> PathBuf {
        let (from, to) = self.suffixes();
        PathBuf::from(format!("scikit-hep-{}-{}.csv", from, to))
    }
}

fn check(what: &'static str, value: &str, pattern: &Regex) -> Result<()> {
    if !pattern.is_match(value) {
        return Err(FetchError::Invalid {
            what,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Builds the query over every daily table in `range` for pip downloads of
/// `packages`.
pub fn build_query(table: &str, range: &DateRange, packages: &[String]) -> Result<String> {
    let table_pattern = Regex::new(r"^[A-Za-z0-9_.*-]+$")?;
    let package_pattern = Regex::new(r"^[A-Za-z0-9._-]+$")?;
    check("table", table, &table_pattern)?;
    if packages.is_empty() {
        return Err(FetchError::Invalid {
            what: "package list",
            value: String::new(),
        });
    }
    for package in packages {
        check("package", package, &package_pattern)?;
    }

    let fields = FIELDS
        .iter()
        .map(|(expr, alias)| {
            if expr == alias {
                format!("  {}", expr)
            } else {
                format!("  {} AS {}", expr, alias)
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let names = packages
        .iter()
        .map(|p| format!("    '{}'", p))
        .collect::<Vec<_>>()
        .join(",\n");
    let (from, to) = range.suffixes();

    Ok(format!(
        "SELECT\n{fields}\nFROM `{table}`\nWHERE\n  _TABLE_SUFFIX BETWEEN '{from}' AND '{to}'\n  AND details.installer.name = 'pip'\n  AND file.project IN (\n{names}\n  )\n"
    ))
}
