//! Fill styles for stacked categories: every color once, then the next hatch.

use config::{parse_hex, Hatch};
use plotters::style::RGBColor;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: RGBColor,
    pub hatch: Hatch,
}

/// Cartesian product of hatches (outer) and colors (inner).
#[derive(Debug, Clone)]
pub struct StyleCycle {
    colors: Vec<RGBColor>,
    hatches: Vec<Hatch>,
}

impl StyleCycle {
    pub fn new(colors: Vec<RGBColor>, hatches: Vec<Hatch>) -> Self {
        StyleCycle { colors, hatches }
    }

    pub fn from_config(chart: &config::Chart) -> Result<Self> {
        let colors = chart
            .colors
            .iter()
            .map(|c| parse_hex(c).map(|(r, g, b)| RGBColor(r, g, b)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(StyleCycle::new(colors, chart.hatches.clone()))
    }

    /// Number of distinct styles before the cycle repeats.
    pub fn len(&self) -> usize {
        self.colors.len() * self.hatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nth(&self, index: usize) -> Style {
        let n = self.colors.len().max(1);
        Style {
            color: self.colors.get(index % n).copied().unwrap_or(RGBColor(0, 0, 0)),
            hatch: self
                .hatches
                .get((index / n) % self.hatches.len().max(1))
                .copied()
                .unwrap_or(Hatch::None),
        }
    }
}

type Point = (i32, i32);

/// Line segments that hatch the pixel rectangle spanned by `a` and `b`.
/// Every endpoint lies on or inside the rectangle.
pub fn hatch_lines(hatch: Hatch, a: Point, b: Point) -> Vec<[Point; 2]> {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    let mut lines = Vec::new();
    match hatch {
        Hatch::None => {}
        Hatch::Diagonal => rising(&mut lines, (x0, y0, x1, y1), 8),
        Hatch::Cross => {
            let step = 8;
            let mut y = y0 + step;
            while y < y1 {
                lines.push([(x0, y), (x1, y)]);
                y += step;
            }
            let mut x = x0 + step;
            while x < x1 {
                lines.push([(x, y0), (x, y1)]);
                x += step;
            }
        }
        Hatch::DenseCross => {
            rising(&mut lines, (x0, y0, x1, y1), 5);
            falling(&mut lines, (x0, y0, x1, y1), 5);
        }
    }
    lines
}

// "/" in screen space: x + y = c
fn rising(lines: &mut Vec<[Point; 2]>, (x0, y0, x1, y1): (i32, i32, i32, i32), step: i32) {
    let mut c = x0 + y0 + step;
    while c < x1 + y1 {
        let lo = x0.max(c - y1);
        let hi = x1.min(c - y0);
        if lo < hi {
            lines.push([(lo, c - lo), (hi, c - hi)]);
        }
        c += step;
    }
}

// "\" in screen space: x - y = c
fn falling(lines: &mut Vec<[Point; 2]>, (x0, y0, x1, y1): (i32, i32, i32, i32), step: i32) {
    let mut c = x0 - y1 + step;
    while c < x1 - y0 {
        let lo = x0.max(c + y0);
        let hi = x1.min(c + y1);
        if lo < hi {
            lines.push([(lo, lo - c), (hi, hi - c)]);
        }
        c += step;
    }
}

/// Small glyph drawn over legend swatches, relative to the swatch centre.
pub fn legend_glyph(hatch: Hatch) -> Vec<Point> {
    match hatch {
        Hatch::None => vec![],
        Hatch::Diagonal => vec![(-4, 4), (4, -4)],
        Hatch::Cross => vec![(-4, 0), (4, 0), (0, 0), (0, -4), (0, 4)],
        Hatch::DenseCross => vec![(-4, -4), (4, 4), (0, 0), (4, -4), (-4, 4)],
    }
}
