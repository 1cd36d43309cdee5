//! Chart rendering with Plotters.
//!
//! Charts are data-driven descriptions (`FitChart`, `PreviewChart`): every
//! series and bound is computed before drawing, so `draw()` only draws and the
//! data prep can be tested without touching an image backend.
//!
//! Rendering targets a file. Interactive display is replaced by writing the
//! image; PNG/JPEG/BMP go through the bitmap backend and `.svg` through the SVG
//! backend. Both lay text out with the bundled font (see [`font`]).

use std::error::Error;
use std::path::Path;

use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::ImageKind;
use crate::error::AppError;

pub mod fit_chart;
pub mod font;
pub mod preview;

pub use fit_chart::FitChart;
pub use preview::PreviewChart;

/// Figure size in inches (width, height).
pub const FIGURE_INCHES: (f64, f64) = (6.4, 4.8);

/// Default output resolution.
pub const DEFAULT_DPI: u32 = 600;

/// Something that can draw itself onto any Plotters drawing area.
pub trait Chart {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, scale: &Scale) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// Pixel sizes derived from the output DPI (points → pixels).
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub dpi: u32,
}

impl Scale {
    pub fn new(dpi: u32) -> Self {
        Self { dpi: dpi.max(1) }
    }

    /// Image size in pixels.
    pub fn size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (FIGURE_INCHES.0 * dpi).round() as u32,
            (FIGURE_INCHES.1 * dpi).round() as u32,
        )
    }

    /// Convert typographic points to whole pixels (at least 1).
    pub fn pt(&self, points: f64) -> u32 {
        ((points * self.dpi as f64 / 72.0).round() as u32).max(1)
    }

    pub fn font(&self, points: f64) -> (&'static str, i32) {
        (font::FONT_FAMILY, self.pt(points) as i32)
    }
}

/// Render `chart` into `path` (format chosen by extension).
///
/// The caller decides where `path` lives; `app::pipeline` points it at a
/// staging file so a failed render never leaves a partial image behind.
pub fn render_chart<C: Chart>(chart: &C, path: &Path, kind: ImageKind, dpi: u32) -> Result<(), AppError> {
    let scale = Scale::new(dpi);
    let size = scale.size();
    debug!("Rendering {kind:?} chart {}x{} to '{}'", size.0, size.1, path.display());

    let render_err = |e: Box<dyn Error>| AppError::Render {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    font::ensure_registered().map_err(|message| AppError::Render {
        path: path.to_path_buf(),
        message,
    })?;

    match kind {
        ImageKind::Bitmap => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            chart.draw(&root, &scale).map_err(render_err)?;
            root.present().map_err(|e| render_err(Box::new(e) as Box<dyn Error>))?;
        }
        ImageKind::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            chart.draw(&root, &scale).map_err(render_err)?;
            root.present().map_err(|e| render_err(Box::new(e) as Box<dyn Error>))?;
        }
    }
    Ok(())
}

/// `[min, max]` of a set of values, widened when degenerate and padded by 5%.
pub fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        let pad = lo.abs().max(1.0) * 0.05;
        return Some((lo - pad, hi + pad));
    }
    let pad = span * 0.05;
    Some((lo - pad, hi + pad))
}
