use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::schema::COLUMNS;

/// (timestamp, file_project, file_version, country_code); everything else
/// describes the same Linux box.
pub type Row<'a> = (&'a str, &'a str, &'a str, Option<&'a str>);

pub fn frame(rows: &[Row]) -> DataFrame {
    let columns = COLUMNS
        .iter()
        .map(|name| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|(ts, project, version, country)| match *name {
                    "timestamp" => Some(*ts),
                    "file_project" => Some(*project),
                    "file_version" => Some(*version),
                    "country_code" => *country,
                    "details_system_name" => Some("Linux"),
                    "details_distro_name" => Some("Ubuntu"),
                    "details_distro_version" => Some("20.04"),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        })
        .collect();
    let mut df = DataFrame::new(columns).unwrap();
    crate::load::parse_timestamps(&mut df, Path::new("fixture")).unwrap();
    df
}

pub const HEADER: &str = "timestamp,country_code,file_project,file_version,file_type,\
details_installer_version,details_python,details_distro_name,details_distro_version,\
details_distro_libc_version,details_system_name,details_system_release,details_cpu,\
details_openssl_version,details_setuptools_version";

/// One CSV line with the given leading fields, the rest filled in.
pub fn line(ts: &str, country: &str, project: &str, version: &str, system: &str) -> String {
    format!(
        "{ts},{country},{project},{version},bdist_wheel,20.0,3.8.5,Ubuntu,08.04,2.31,{system},5.4.0,x86_64,1.1.1f,45.2.0"
    )
}

pub fn write_csv(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for l in lines {
        writeln!(file, "{}", l).unwrap();
    }
    path
}
