use serde::Deserialize;
use std::fs::File;
use std::path::Path;

use log::info;

pub const DEFAULT_FILENAME: &str = ".pypi-stats.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid color {0:?}, expected #rrggbb")]
    Color(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tracked packages eligible for a fetch.
    pub packages: Vec<String>,
    pub bigquery: BigQuery,
    pub chart: Chart,
    pub frequency: Frequency,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BigQuery {
    pub table: String,
    pub project: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pdf,
    Svg,
    Png,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Svg => "svg",
            Format::Png => "png",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Hatch {
    None,
    Diagonal,
    Cross,
    DenseCross,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Chart {
    pub format: Format,
    pub width: u32,
    pub height: u32,
    /// Width of the horizontal frequency charts, which are narrow.
    pub freq_width: u32,
    pub colors: Vec<String>,
    pub hatches: Vec<Hatch>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Frequency {
    /// Categories with at most this many rows are left out.
    pub min_count: u64,
}

const TRACKED_PACKAGES: [&str; 38] = [
    "aghast",
    "awkward",
    "awkward0",
    "awkward1",
    "boost-histogram",
    "decaylanguage",
    "excursion",
    "formulate",
    "hepstats",
    "hepunits",
    "hist",
    "histoprint",
    "iminuit",
    "madminer",
    "mplhep",
    "numpythia",
    "particle",
    "probfit",
    "pyBumpHunter",
    "pyhf",
    "pyjet",
    "pylhe",
    "reana-client",
    "root-numpy",
    "root-pandas",
    "rootpy",
    "scikit-hep",
    "scikit-hep-testdata",
    "scikit-optimize",
    "uhi",
    "uproot",
    "uproot3",
    "uproot4",
    "uproot-methods",
    "uproot3-methods",
    "vector",
    "vegascope",
    "yadage",
];

// matplotlib's default property cycle
const TAB10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

impl Default for Config {
    fn default() -> Self {
        Config {
            packages: TRACKED_PACKAGES.iter().map(|p| p.to_string()).collect(),
            bigquery: BigQuery::default(),
            chart: Chart::default(),
            frequency: Frequency::default(),
        }
    }
}

impl Default for BigQuery {
    fn default() -> Self {
        BigQuery {
            table: "the-psf.pypi.downloads*".to_string(),
            project: None,
        }
    }
}

impl Default for Chart {
    fn default() -> Self {
        Chart {
            format: Format::Pdf,
            width: 1200,
            height: 500,
            freq_width: 400,
            colors: TAB10.iter().map(|c| c.to_string()).collect(),
            hatches: vec![Hatch::None, Hatch::Diagonal, Hatch::Cross, Hatch::DenseCross],
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency { min_count: 8 }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
        let path = filename.as_ref();
        let display = path.display().to_string();
        if !path.exists() {
            info!("no config file {}, using defaults", display);
            return Ok(Config::default());
        }
        let reader = File::open(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Config = serde_yaml::from_reader(reader).map_err(|source| ConfigError::Yaml {
            path: display.clone(),
            source,
        })?;
        config.validate()?;
        info!("config loaded: {}", display);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::Empty("packages"));
        }
        if self.chart.colors.is_empty() {
            return Err(ConfigError::Empty("chart.colors"));
        }
        if self.chart.hatches.is_empty() {
            return Err(ConfigError::Empty("chart.hatches"));
        }
        for color in &self.chart.colors {
            parse_hex(color)?;
        }
        Ok(())
    }
}

/// Parses `#rrggbb` into its components.
pub fn parse_hex(color: &str) -> Result<(u8, u8, u8), ConfigError> {
    let invalid = || ConfigError::Color(color.to_string());
    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_config() {
        let content = r##"packages: [vector, hist]
bigquery:
  project: my-billing
chart:
  format: png
  width: 800
  colors: ["#000000", "#ffffff"]
  hatches: [none, dense_cross]
frequency:
  min_count: 2
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        println!("{:?}", config);
        assert_eq!(config.packages, &["vector", "hist"]);
        assert_eq!(config.bigquery.project.as_deref(), Some("my-billing"));
        assert_eq!(config.bigquery.table, "the-psf.pypi.downloads*");
        assert_eq!(config.chart.format, Format::Png);
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 500);
        assert_eq!(config.chart.hatches, &[Hatch::None, Hatch::DenseCross]);
        assert_eq!(config.frequency.min_count, 2);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.packages.len(), 38);
        assert!(config.packages.iter().any(|p| p == "uproot"));
        assert_eq!(config.chart.format, Format::Pdf);
        assert_eq!(config.chart.colors.len(), 10);
        assert_eq!(config.chart.hatches.len(), 4);
        assert_eq!(config.frequency.min_count, 8);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::load("does/not/exist/.pypi-stats.yml").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_color() {
        let config: Config = serde_yaml::from_str("chart:\n  colors: [red]\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Color(c)) if c == "red"));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#1f77b4").unwrap(), (0x1f, 0x77, 0xb4));
        assert!(parse_hex("1f77b4").is_err());
        assert!(parse_hex("#1f77").is_err());
        assert!(parse_hex("#gg0000").is_err());
    }
}
