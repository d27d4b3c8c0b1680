use std::fs::File;
use std::path::{Path, PathBuf};

use log::{info, warn};
use polars::prelude::*;

use crate::error::{FrameError, Result};
use crate::fingerprint::{dedup, mark, unmark};
use crate::packages;
use crate::schema::{has_column, str_column, COLUMNS, FILE_VERSION, TIMESTAMP};
use crate::timestamp::parse_timestamp;
use crate::version::truncate_minor;

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Keep full versions instead of folding them to major.minor.
    pub minor: bool,
    pub packages: Vec<String>,
    pub filter_packages: Vec<String>,
    pub unique: bool,
    /// Equality filters applied in order.
    pub filters: Vec<(String, String)>,
}

/// The loaded rows after filtering, plus the packages to report on.
#[derive(Debug, Clone)]
pub struct FilteredTable {
    pub df: DataFrame,
    pub packages: Vec<String>,
}

/// Every `*.csv` in `dir`, sorted by name.
pub fn csv_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let io = |source| FrameError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// A zero-row table with every row file column.
pub fn empty_frame() -> Result<DataFrame> {
    let columns = COLUMNS
        .iter()
        .map(|name| match *name {
            TIMESTAMP => Series::new_empty(name, &timestamp_dtype()),
            _ => Series::new_empty(name, &DataType::String),
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Reads one row file with every column as a string, checking the schema
/// and the timestamps.
pub fn read_file(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| FrameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;
    for column in COLUMNS {
        if !has_column(&df, column) {
            return Err(FrameError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    let mut df = df.select(COLUMNS)?;
    parse_timestamps(&mut df, path)?;
    Ok(df)
}

/// Timestamps are held as naive UTC microseconds.
pub fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, None)
}

/// Replaces the string `timestamp` column of a file's rows with a datetime
/// column. Nulls stay null; anything unparseable fails with the file name.
pub(crate) fn parse_timestamps(df: &mut DataFrame, path: &Path) -> Result<()> {
    let micros = str_column(df, TIMESTAMP)?
        .into_iter()
        .map(|ts| match ts {
            None => Ok(None),
            Some(ts) => parse_timestamp(ts)
                .map(|dt| Some(dt.timestamp_micros()))
                .ok_or_else(|| FrameError::Timestamp {
                    path: path.to_path_buf(),
                    value: ts.to_string(),
                }),
        })
        .collect::<Result<Vec<Option<i64>>>>()?;
    let parsed: Int64Chunked = micros.into_iter().collect();
    let parsed = parsed
        .with_name(TIMESTAMP)
        .into_datetime(TimeUnit::Microseconds, None);
    df.with_column(parsed.into_series())?;
    Ok(())
}

/// Reads and concatenates the row files.
pub fn read_files(paths: &[PathBuf]) -> Result<DataFrame> {
    let mut df = empty_frame()?;
    for path in paths {
        let part = read_file(path)?;
        info!("read {} rows from {}", part.height(), path.display());
        df.vstack_mut(&part)?;
    }
    Ok(df)
}

fn fold_versions(df: &mut DataFrame) -> Result<()> {
    let folded: StringChunked = str_column(df, FILE_VERSION)?
        .into_iter()
        .map(|v| v.map(truncate_minor))
        .collect();
    df.with_column(folded.with_name(FILE_VERSION))?;
    Ok(())
}

/// Narrows `df` to the rows whose `key` equals `value`.
pub fn filter_eq(df: DataFrame, key: &str, value: &str) -> Result<DataFrame> {
    if !has_column(&df, key) {
        return Err(FrameError::UnknownColumn(key.to_string()));
    }
    Ok(df.lazy().filter(col(key).eq(lit(value))).collect()?)
}

impl FilteredTable {
    pub fn load(paths: &[PathBuf], options: &LoadOptions) -> Result<FilteredTable> {
        let df = read_files(paths)?;
        FilteredTable::from_frame(df, options)
    }

    pub fn from_frame(mut df: DataFrame, options: &LoadOptions) -> Result<FilteredTable> {
        // fingerprints see the full version
        mark(&mut df)?;

        if !options.minor {
            fold_versions(&mut df)?;
        }

        let packages = packages::resolve(&df, &options.packages, &options.filter_packages)?;

        if options.unique {
            info!("Before unique filter: {}", df.height());
            df = dedup(df)?;
            info!("After unique filter: {}", df.height());
        }

        for (key, value) in &options.filters {
            info!("Before filter: {} {} == {}", df.height(), key, value);
            df = filter_eq(df, key, value)?;
            info!("After filter: {}", df.height());
        }

        let df = unmark(df)?;
        if df.height() == 0 {
            warn!("no rows left after filtering");
        }
        info!("Packages: {}", packages.join(" "));
        Ok(FilteredTable { df, packages })
    }

    /// Rows of a single package.
    pub fn package(&self, name: &str) -> Result<DataFrame> {
        filter_eq(self.df.clone(), crate::schema::FILE_PROJECT, name)
    }

    /// Rows of every resolved package.
    pub fn resolved(&self) -> Result<DataFrame> {
        let projects = str_column(&self.df, crate::schema::FILE_PROJECT)?;
        let mask: BooleanChunked = projects
            .into_iter()
            .map(|p| p.is_some_and(|p| self.packages.iter().any(|k| k == p)))
            .collect();
        Ok(self.df.filter(&mask)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{line, write_csv};
    use tempfile::tempdir;

    fn versions(df: &DataFrame) -> Vec<String> {
        str_column(df, FILE_VERSION)
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or("").to_string())
            .collect()
    }

    fn filters(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_read_and_concat() {
        let dir = tempdir().unwrap();
        let a = write_csv(
            dir.path(),
            "a.csv",
            &[line("2020-01-01 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux")],
        );
        let b = write_csv(
            dir.path(),
            "b.csv",
            &[
                line("2020-01-02 10:00:00+00:00", "", "hist", "2.0.1", "Darwin"),
                line("2020-01-03 10:00:00+00:00", "US", "hist", "2.0.1", "Linux"),
            ],
        );
        let df = read_files(&[a, b]).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names(), COLUMNS.to_vec());

        let distro: Vec<_> = str_column(&df, "details_distro_version")
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(distro, vec![Some("08.04"); 3]);

        let country: Vec<_> = str_column(&df, "country_code").unwrap().into_iter().collect();
        assert_eq!(country, vec![Some("DE"), None, Some("US")]);
    }

    #[test]
    fn test_csv_files_in_dir() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "b.csv", &[]);
        write_csv(dir.path(), "a.csv", &[]);
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let files = csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_no_files_is_empty() {
        let table = FilteredTable::load(&[], &LoadOptions::default()).unwrap();
        assert_eq!(table.df.height(), 0);
        assert!(table.packages.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        std::fs::write(&path, "timestamp,file_project\n2020-01-01,vector\n").unwrap();
        let err = read_file(&path).unwrap_err();
        match &err {
            FrameError::MissingColumn { column, .. } => assert_eq!(column, "country_code"),
            other => panic!("unexpected error {other}"),
        }
        assert!(err.to_string().contains("short.csv"));
    }

    #[test]
    fn test_bad_timestamp() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "bad.csv",
            &[line("last tuesday", "DE", "vector", "1.0.0", "Linux")],
        );
        let err = read_file(&path).unwrap_err();
        assert!(matches!(err, FrameError::Timestamp { ref value, .. } if value == "last tuesday"));
    }

    #[test]
    fn test_minor_folding() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "v.csv",
            &[
                line("2020-01-06 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux"),
                line("2020-01-07 10:00:00+00:00", "DE", "vector", "1.0.1", "Linux"),
                line("2020-01-08 10:00:00+00:00", "DE", "vector", "1.1.0", "Linux"),
            ],
        );
        let folded = FilteredTable::load(&[path.clone()], &LoadOptions::default()).unwrap();
        assert_eq!(versions(&folded.df), vec!["1.0", "1.0", "1.1"]);

        let options = LoadOptions {
            minor: true,
            ..Default::default()
        };
        let full = FilteredTable::load(&[path], &options).unwrap();
        assert_eq!(versions(&full.df), vec!["1.0.0", "1.0.1", "1.1.0"]);
    }

    #[test]
    fn test_unique_uses_full_version() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "u.csv",
            &[
                line("2020-01-06 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux"),
                line("2020-01-07 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux"),
                line("2020-01-08 10:00:00+00:00", "DE", "vector", "1.0.1", "Linux"),
            ],
        );
        let options = LoadOptions {
            unique: true,
            ..Default::default()
        };
        let table = FilteredTable::load(&[path], &options).unwrap();
        assert_eq!(table.df.height(), 2);
        assert_eq!(versions(&table.df), vec!["1.0", "1.0"]);
    }

    #[test]
    fn test_filters_narrow_in_order() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "f.csv",
            &[
                line("2020-01-06 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux"),
                line("2020-01-06 10:00:00+00:00", "DE", "vector", "1.0.0", "Darwin"),
                line("2020-01-06 10:00:00+00:00", "DE", "hist", "2.0.0", "Linux"),
            ],
        );
        let options = LoadOptions {
            filters: filters(&[("file_project", "vector"), ("details_system_name", "Linux")]),
            ..Default::default()
        };
        let table = FilteredTable::load(&[path.clone()], &options).unwrap();
        assert_eq!(table.df.height(), 1);
        // packages are resolved before row filters
        assert_eq!(table.packages, vec!["vector", "hist"]);

        let options = LoadOptions {
            filters: filters(&[("file_project", "vector"), ("details_system", "Linux")]),
            ..Default::default()
        };
        let err = FilteredTable::load(&[path], &options).unwrap_err();
        assert!(matches!(err, FrameError::UnknownColumn(ref c) if c == "details_system"));
    }

    #[test]
    fn test_package_views() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "p.csv",
            &[
                line("2020-01-06 10:00:00+00:00", "DE", "vector", "1.0.0", "Linux"),
                line("2020-01-06 10:00:00+00:00", "DE", "hist", "2.0.0", "Linux"),
                line("2020-01-06 10:00:00+00:00", "DE", "uproot", "4.0.0", "Linux"),
            ],
        );
        let options = LoadOptions {
            filter_packages: vec!["uproot".to_string()],
            ..Default::default()
        };
        let table = FilteredTable::load(&[path], &options).unwrap();
        assert_eq!(table.package("hist").unwrap().height(), 1);
        assert_eq!(table.resolved().unwrap().height(), 2);
    }
}
