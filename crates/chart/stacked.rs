//! Stacked bar charts over a time axis.
//!
//! The first category sits at the bottom and every later one is stacked on
//! the running total at that bucket. The legend reads top to bottom, so it
//! lists the layers in reverse stacking order.

use chrono::{Duration, NaiveDate};
use frame::WideTable;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::figure::Render;
use crate::style::{hatch_lines, legend_glyph, Style, StyleCycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub bucket: usize,
    pub bottom: u64,
    pub top: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub category: String,
    pub style: Style,
    /// One segment per bucket, zero-height ones included.
    pub segments: Vec<Segment>,
}

/// Layers in stacking order, bottom first.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedLayout {
    pub layers: Vec<Layer>,
}

impl StackedLayout {
    pub fn new(table: &WideTable, cycle: &StyleCycle) -> Self {
        let mut running = vec![0u64; table.buckets.len()];
        let layers = table
            .categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let segments = table
                    .column(i)
                    .enumerate()
                    .map(|(bucket, count)| {
                        let bottom = running[bucket];
                        running[bucket] += count;
                        Segment {
                            bucket,
                            bottom,
                            top: running[bucket],
                        }
                    })
                    .collect();
                Layer {
                    category: category.clone(),
                    style: cycle.nth(i),
                    segments,
                }
            })
            .collect();
        StackedLayout { layers }
    }

    /// Topmost layer first.
    pub fn legend(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().rev()
    }

    pub fn max_total(&self) -> u64 {
        self.layers
            .last()
            .map(|l| l.segments.iter().map(|s| s.top).max().unwrap_or(0))
            .unwrap_or(0)
    }
}

pub struct StackedChart<'a> {
    pub buckets: &'a [NaiveDate],
    pub layout: StackedLayout,
    pub title: String,
    pub y_label: String,
    pub bar_days: i64,
}

impl Render for StackedChart<'_> {
    fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)?;
        let (Some(first), Some(last)) = (self.buckets.first(), self.buckets.last()) else {
            return Ok(());
        };
        let first = *first;
        let span = ((*last - first).num_days() + self.bar_days) as f64;
        let y_max = (self.layout.max_total() as f64 * 1.05).max(1.0);

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..span, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(12)
            .x_label_formatter(&|x: &f64| {
                (first + Duration::days(*x as i64))
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .y_desc(self.y_label.as_str())
            .draw()?;

        let offsets: Vec<f64> = self
            .buckets
            .iter()
            .map(|b| (*b - first).num_days() as f64)
            .collect();
        let width = self.bar_days as f64;
        let outline = BLACK.mix(0.6).stroke_width(1);

        // Drawing order only affects the legend; segments never overlap.
        for layer in self.layout.legend() {
            let style = layer.style;
            let visible: Vec<&Segment> =
                layer.segments.iter().filter(|s| s.top > s.bottom).collect();
            chart
                .draw_series(visible.iter().map(|s| {
                    let x = offsets[s.bucket];
                    Rectangle::new(
                        [(x, s.bottom as f64), (x + width, s.top as f64)],
                        style.color.filled(),
                    )
                }))?
                .label(layer.category.as_str())
                .legend(move |(x, y)| {
                    EmptyElement::at((x + 6, y))
                        + Rectangle::new([(-6, -5), (6, 5)], style.color.filled())
                        + PathElement::new(legend_glyph(style.hatch), BLACK.stroke_width(1))
                });

            for s in &visible {
                let x = offsets[s.bucket];
                let a = chart.backend_coord(&(x, s.top as f64));
                let b = chart.backend_coord(&(x + width, s.bottom as f64));
                for [p, q] in hatch_lines(style.hatch, a, b) {
                    root.draw(&PathElement::new(vec![p, q], outline))?;
                }
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::MiddleLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table() -> WideTable {
        let mut counts = BTreeMap::new();
        counts.insert((date("2020-01-06"), "1.0".to_string()), 3);
        counts.insert((date("2020-01-06"), "1.1".to_string()), 2);
        counts.insert((date("2020-01-06"), "2.0".to_string()), 1);
        counts.insert((date("2020-01-13"), "1.1".to_string()), 4);
        counts.insert((date("2020-01-13"), "2.0".to_string()), 5);
        WideTable::from_counts(&counts)
    }

    fn cycle() -> StyleCycle {
        StyleCycle::from_config(&config::Chart::default()).unwrap()
    }

    #[test]
    fn test_cumulative_offsets() {
        let layout = StackedLayout::new(&table(), &cycle());
        let bottoms: Vec<Vec<u64>> = layout
            .layers
            .iter()
            .map(|l| l.segments.iter().map(|s| s.bottom).collect())
            .collect();
        assert_eq!(bottoms, vec![vec![0, 0], vec![3, 0], vec![5, 4]]);
        for segment in layout.layers.iter().flat_map(|l| &l.segments) {
            assert!(segment.top >= segment.bottom);
        }
    }

    #[test]
    fn test_last_top_is_row_total() {
        let table = table();
        let layout = StackedLayout::new(&table, &cycle());
        let last = layout.layers.last().unwrap();
        for (row, segment) in last.segments.iter().enumerate() {
            assert_eq!(segment.top, table.row_total(row));
        }
        assert_eq!(layout.max_total(), 9);
    }

    #[test]
    fn test_legend_is_reversed() {
        let layout = StackedLayout::new(&table(), &cycle());
        let legend: Vec<&str> = layout.legend().map(|l| l.category.as_str()).collect();
        assert_eq!(legend, vec!["2.0", "1.1", "1.0"]);
    }

    #[test]
    fn test_styles_follow_column_order() {
        let cycle = cycle();
        let layout = StackedLayout::new(&table(), &cycle);
        for (i, layer) in layout.layers.iter().enumerate() {
            assert_eq!(layer.style, cycle.nth(i));
        }
    }

    #[test]
    fn test_empty_table() {
        let layout = StackedLayout::new(&WideTable::default(), &cycle());
        assert!(layout.layers.is_empty());
        assert_eq!(layout.max_total(), 0);
    }
}
