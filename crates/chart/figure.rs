use std::path::{Path, PathBuf};

use config::Format;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{ChartError, Result};

/// Converts a rendered SVG document into a single-page PDF. Text is laid
/// out with the system fonts.
fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| ChartError::Pdf(e.to_string()))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| ChartError::Pdf(e.to_string()))
}

/// Something that can draw itself onto any plotters backend.
pub trait Render {
    fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    pub format: Format,
    pub width: u32,
    pub height: u32,
}

impl Figure {
    pub fn new(format: Format, width: u32, height: u32) -> Self {
        Figure {
            format,
            width,
            height,
        }
    }

    /// `stem` plus the extension of the output format.
    pub fn path(&self, stem: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", stem, self.format.extension()))
    }

    pub fn save<R: Render>(&self, plot: &R, path: &Path) -> Result<()> {
        let size = (self.width, self.height);
        match self.format {
            Format::Pdf => {
                let mut svg = String::new();
                {
                    let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                    plot.render(&root)?;
                    root.present()?;
                }
                let pdf = svg_to_pdf(&svg)?;
                std::fs::write(path, pdf).map_err(|source| ChartError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            Format::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                plot.render(&root)?;
                root.present()?;
            }
            Format::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                plot.render(&root)?;
                root.present()?;
            }
        }
        info!("  Saved {}", path.display());
        Ok(())
    }
}
