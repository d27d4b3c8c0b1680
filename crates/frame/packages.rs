use std::collections::HashSet;

use log::warn;
use polars::prelude::*;

use crate::error::{FrameError, Result};
use crate::schema::{str_column, FILE_PROJECT};

/// Distinct `file_project` values in first-seen order.
pub fn distinct_projects(df: &DataFrame) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(str_column(df, FILE_PROJECT)?
        .into_iter()
        .flatten()
        .filter(|p| seen.insert(*p))
        .map(str::to_string)
        .collect())
}

/// Removes every name in `deny` from `packages`. Names that are not in
/// `packages` are all reported together.
pub fn difference(packages: Vec<String>, deny: &[String]) -> Result<Vec<String>> {
    let present: HashSet<&str> = packages.iter().map(String::as_str).collect();
    let missing: Vec<String> = deny
        .iter()
        .filter(|d| !present.contains(d.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(FrameError::UnknownPackage(missing));
    }
    let deny: HashSet<&str> = deny.iter().map(String::as_str).collect();
    Ok(packages
        .into_iter()
        .filter(|p| !deny.contains(p.as_str()))
        .collect())
}

/// The working package list: the allow-list (or everything present) minus
/// the deny-list. Always a subset of the projects in `df`.
pub fn resolve(df: &DataFrame, allow: &[String], deny: &[String]) -> Result<Vec<String>> {
    let present = distinct_projects(df)?;
    let packages = if allow.is_empty() {
        present
    } else {
        let known: HashSet<&str> = present.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();
        allow
            .iter()
            .filter(|p| seen.insert(p.as_str()))
            .filter(|p| {
                let found = known.contains(p.as_str());
                if !found {
                    warn!("package {} has no rows, skipping", p);
                }
                found
            })
            .cloned()
            .collect()
    };
    difference(packages, deny)
}
