//! The three plot commands run over a loaded table.

use std::path::PathBuf;

use frame::aggregate::{aggregate, distinct, frequencies};
use frame::schema::{has_column, FILE_PROJECT};
use frame::{Bucket, FilteredTable, FrameError};
use log::info;

use crate::barh::FrequencyChart;
use crate::error::Result;
use crate::figure::Figure;
use crate::stacked::{StackedChart, StackedLayout};
use crate::style::StyleCycle;

/// Output settings shared by every command of one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Prepended to every output file name.
    pub prefix: String,
    pub figure: Figure,
    pub freq_figure: Figure,
    pub cycle: StyleCycle,
    pub min_count: u64,
}

impl Settings {
    pub fn from_config(prefix: &str, conf: &config::Config) -> Result<Settings> {
        let chart = &conf.chart;
        Ok(Settings {
            prefix: prefix.to_string(),
            figure: Figure::new(chart.format, chart.width, chart.height),
            freq_figure: Figure::new(chart.format, chart.freq_width, chart.height),
            cycle: StyleCycle::from_config(chart)?,
            min_count: conf.frequency.min_count,
        })
    }
}

fn check_key(table: &FilteredTable, key: &str) -> Result<()> {
    if !has_column(&table.df, key) {
        return Err(FrameError::UnknownColumn(key.to_string()).into());
    }
    Ok(())
}

fn y_label(bucket: Bucket) -> String {
    format!("Number of downloads per {}", bucket.label())
}

/// One stacked chart per package, stacked over `key`.
pub fn per_package(
    table: &FilteredTable,
    settings: &Settings,
    key: &str,
    bucket: Bucket,
) -> Result<Vec<PathBuf>> {
    check_key(table, key)?;
    let mut saved = Vec::new();
    for name in &table.packages {
        let df = table.package(name)?;
        info!(
            "Computing {} entries for {} with {} unique {}",
            df.height(),
            name,
            distinct(&df, key)?,
            key
        );
        let wide = aggregate(&df, key, bucket)?;
        if wide.is_empty() {
            info!("  nothing to plot for {}", name);
            continue;
        }
        let chart = StackedChart {
            buckets: &wide.buckets,
            layout: StackedLayout::new(&wide, &settings.cycle),
            title: name.clone(),
            y_label: y_label(bucket),
            bar_days: bucket.days(),
        };
        let path = settings
            .figure
            .path(&format!("{}{}_{}", settings.prefix, key, name));
        settings.figure.save(&chart, &path)?;
        saved.push(path);
    }
    Ok(saved)
}

/// A single stacked chart over all resolved packages.
pub fn comparison(
    table: &FilteredTable,
    settings: &Settings,
    key: &str,
    bucket: Bucket,
) -> Result<Option<PathBuf>> {
    check_key(table, key)?;
    let df = table.resolved()?;
    info!(
        "Computing {} entries with {} unique {}",
        df.height(),
        distinct(&df, key)?,
        key
    );
    let wide = aggregate(&df, key, bucket)?;
    if wide.is_empty() {
        info!("  nothing to plot");
        return Ok(None);
    }
    let title = if key == FILE_PROJECT {
        "Projects".to_string()
    } else {
        key.to_string()
    };
    let chart = StackedChart {
        buckets: &wide.buckets,
        layout: StackedLayout::new(&wide, &settings.cycle),
        title,
        y_label: y_label(bucket),
        bar_days: bucket.days(),
    };
    let path = settings
        .figure
        .path(&format!("{}all_{}", settings.prefix, key));
    settings.figure.save(&chart, &path)?;
    Ok(Some(path))
}

/// One horizontal bar chart per package, counting rows per `key` value.
pub fn frequency(table: &FilteredTable, settings: &Settings, key: &str) -> Result<Vec<PathBuf>> {
    check_key(table, key)?;
    let mut saved = Vec::new();
    for name in &table.packages {
        let df = table.package(name)?;
        let counts = frequencies(&df, key, settings.min_count)?;
        info!(
            "Computing {} entries for {} with {} {} above {}",
            df.height(),
            name,
            counts.len(),
            key,
            settings.min_count
        );
        if counts.is_empty() {
            continue;
        }
        let chart = FrequencyChart {
            counts: &counts,
            title: name.clone(),
            y_label: key.to_string(),
            color: settings.cycle.nth(0).color,
        };
        let path = settings
            .freq_figure
            .path(&format!("{}freq_{}_{}", settings.prefix, key, name));
        settings.freq_figure.save(&chart, &path)?;
        saved.push(path);
    }
    Ok(saved)
}
