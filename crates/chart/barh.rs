//! Horizontal bars, one per category.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::Result;
use crate::figure::Render;

pub struct FrequencyChart<'a> {
    /// Ascending by count; drawn bottom to top so the largest is on top.
    pub counts: &'a [(String, u64)],
    pub title: String,
    pub y_label: String,
    pub color: RGBColor,
}

impl Render for FrequencyChart<'_> {
    fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE)?;
        let n = self.counts.len();
        let x_max = self.counts.iter().map(|(_, c)| *c).max().unwrap_or(0) as f64 * 1.1;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(0f64..x_max.max(1.0), (0usize..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_labels(4)
            .y_labels(n.max(1))
            .y_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => self
                    .counts
                    .get(*i)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc(self.y_label.as_str())
            .draw()?;

        chart.draw_series(self.counts.iter().enumerate().map(|(i, (_, count))| {
            Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (*count as f64, SegmentValue::Exact(i + 1)),
                ],
                self.color.filled(),
            )
        }))?;
        Ok(())
    }
}
