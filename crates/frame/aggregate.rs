//! Counting rows per (time bucket, category) and per category.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{FrameError, Result};
use crate::schema::{has_column, TIMESTAMP};

const BUCKET: &str = "__bucket";
const COUNT: &str = "__count";

// 1970-01-01 as days from the common era; it was a Thursday
const EPOCH_DAYS_FROM_CE: i32 = 719_163;
const EPOCH_DAYS_AFTER_MONDAY: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Daily,
    /// Monday-start weeks, labelled by their Monday.
    Weekly,
}

impl Bucket {
    pub fn from_daily(daily: bool) -> Self {
        if daily {
            Bucket::Daily
        } else {
            Bucket::Weekly
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Daily => "day",
            Bucket::Weekly => "week",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            Bucket::Daily => 1,
            Bucket::Weekly => 7,
        }
    }

    /// The bucket start of each timestamp, as days since the epoch.
    fn expr(&self) -> Expr {
        let day = col(TIMESTAMP).dt().date().cast(DataType::Int32);
        let start = match self {
            Bucket::Daily => day,
            Bucket::Weekly => day.clone() - (day + lit(EPOCH_DAYS_AFTER_MONDAY)) % lit(7),
        };
        start.cast(DataType::Int32)
    }
}

fn epoch_day(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

/// Counts with one row per bucket (ascending) and one column per category
/// (sorted). Rows and columns that are entirely zero never appear.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WideTable {
    pub buckets: Vec<NaiveDate>,
    pub categories: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<u64>>,
}

impl WideTable {
    /// Pivots long counts; missing combinations become zero.
    pub fn from_counts(counts: &BTreeMap<(NaiveDate, String), u64>) -> WideTable {
        let nonzero = || counts.iter().filter(|(_, n)| **n > 0);
        let mut buckets: Vec<NaiveDate> = nonzero().map(|((b, _), _)| *b).collect();
        buckets.dedup();
        let mut categories: Vec<String> = nonzero().map(|((_, c), _)| c.clone()).collect();
        categories.sort();
        categories.dedup();
        let mut table = vec![vec![0u64; categories.len()]; buckets.len()];
        for ((b, c), n) in nonzero() {
            if let (Ok(row), Ok(column)) = (buckets.binary_search(b), categories.binary_search(c)) {
                table[row][column] = *n;
            }
        }
        WideTable {
            buckets,
            categories,
            counts: table,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() || self.categories.is_empty()
    }

    /// Counts of category `index` down the buckets.
    ///
    /// # Panics
    ///
    /// If `index` is not below `categories.len()`.
    pub fn column(&self, index: usize) -> impl Iterator<Item = u64> + '_ {
        self.counts.iter().map(move |row| row[index])
    }

    /// # Panics
    ///
    /// If `row` is not below `buckets.len()`.
    pub fn row_total(&self, row: usize) -> u64 {
        self.counts[row].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

fn check_key(df: &DataFrame, key: &str) -> Result<()> {
    if !has_column(df, key) {
        return Err(FrameError::UnknownColumn(key.to_string()));
    }
    Ok(())
}

/// Rows that count: a timestamp and a `key` value are both present.
fn counted(df: &DataFrame, key: &str) -> LazyFrame {
    df.clone()
        .lazy()
        .filter(col(TIMESTAMP).is_not_null().and(col(key).is_not_null()))
}

fn count_column(df: &DataFrame) -> Result<Series> {
    Ok(df.column(COUNT)?.cast(&DataType::UInt64)?)
}

/// Distinct non-null values of `key`.
pub fn distinct(df: &DataFrame, key: &str) -> Result<usize> {
    check_key(df, key)?;
    Ok(df.column(key)?.drop_nulls().n_unique()?)
}

/// Counts rows per bucket and `key` value.
pub fn aggregate(df: &DataFrame, key: &str, bucket: Bucket) -> Result<WideTable> {
    check_key(df, key)?;
    let grouped = counted(df, key)
        .group_by([bucket.expr().alias(BUCKET), col(key)])
        .agg([len().alias(COUNT)])
        .collect()?;

    let days = grouped.column(BUCKET)?.i32()?;
    let keys = grouped.column(key)?.str()?;
    let counts = count_column(&grouped)?;
    let mut long = BTreeMap::new();
    for ((day, category), n) in days.into_iter().zip(keys).zip(counts.u64()?) {
        if let (Some(start), Some(category), Some(n)) = (day.and_then(epoch_day), category, n) {
            long.insert((start, category.to_string()), n);
        }
    }
    Ok(WideTable::from_counts(&long))
}

/// Rows per `key` value, ascending by count, leaving out values with at most
/// `min_count` rows.
pub fn frequencies(df: &DataFrame, key: &str, min_count: u64) -> Result<Vec<(String, u64)>> {
    check_key(df, key)?;
    let grouped = counted(df, key)
        .group_by([col(key)])
        .agg([len().alias(COUNT)])
        .filter(col(COUNT).gt(lit(min_count)))
        .sort([COUNT, key], SortMultipleOptions::default())
        .collect()?;

    let keys = grouped.column(key)?.str()?;
    let counts = count_column(&grouped)?;
    Ok(keys
        .into_iter()
        .zip(counts.u64()?)
        .filter_map(|(k, n)| Some((k?.to_string(), n?)))
        .collect())
}
