//! RPM vs. oil pressure comparison chart.
//!
//! Layers, bottom to top:
//! 1. all primary samples (grey, low opacity; the fit only saw those above the bound)
//! 2. optional failure samples (red, low opacity)
//! 3. the fitted curve, labelled with its coefficients
//! 4. optional cutoff line (a percentage of the fitted curve)

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{FitParams, OilSamples};
use crate::fit::scaled;
use crate::plot::{Chart, Scale, padded_range};

pub const TITLE: &str = "RPM vs. Oil Pressure";
pub const X_LABEL: &str = "RPM";
pub const Y_LABEL: &str = "Oil Pressure [psi]";

const SAMPLE_COLOR: RGBColor = RGBColor(128, 128, 128);
const FAILURE_COLOR: RGBColor = RGBColor(214, 39, 40);
const CURVE_COLOR: RGBColor = RGBColor(63, 0, 125);
const CUTOFF_COLOR: RGBColor = RGBColor(255, 127, 14);
const GRID_COLOR: RGBColor = RGBColor(234, 234, 242);
const SCATTER_ALPHA: f64 = 0.15;

/// Render-only description of the comparison chart.
pub struct FitChart<'a> {
    /// Unfiltered primary samples.
    pub samples: &'a OilSamples,
    /// Raw samples of the failure log, if overlaid.
    pub secondary: Option<&'a OilSamples>,
    /// Dense fitted curve.
    pub curve: &'a [(f64, f64)],
    pub curve_label: String,
    /// `(percent, points)` of the cutoff line.
    pub cutoff: Option<(f64, Vec<(f64, f64)>)>,
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
}

impl<'a> FitChart<'a> {
    pub fn new(
        samples: &'a OilSamples,
        secondary: Option<&'a OilSamples>,
        params: &FitParams,
        curve: &'a [(f64, f64)],
        cutoff_percent: Option<f64>,
    ) -> Self {
        let cutoff = cutoff_percent.map(|p| (p, scaled(curve, p)));

        let secondary_pts = secondary.into_iter().flat_map(|s| s.points());
        let cutoff_pts = cutoff.iter().flat_map(|(_, pts)| pts.iter().copied());
        let all: Vec<(f64, f64)> = samples
            .points()
            .chain(secondary_pts)
            .chain(curve.iter().copied())
            .chain(cutoff_pts)
            .collect();

        let x_bounds = padded_range(all.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
        let y_bounds = padded_range(all.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));

        Self {
            samples,
            secondary,
            curve,
            curve_label: curve_legend(params),
            cutoff,
            x_bounds,
            y_bounds,
        }
    }
}

/// Legend text of the fitted curve (two decimals).
pub fn curve_legend(params: &FitParams) -> String {
    format!("{:.2} * ln(rpm + {:.2}) + {:.2}", params.a, params.b, params.c)
}

/// Legend text of the cutoff line.
pub fn cutoff_legend(percent: f64) -> String {
    format!("{percent}% cutoff")
}

impl Chart for FitChart<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, scale: &Scale) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let (x0, x1) = self.x_bounds;
        let (y0, y1) = self.y_bounds;

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, scale.font(12.0))
            .margin(scale.pt(8.0))
            .x_label_area_size(scale.pt(30.0))
            .y_label_area_size(scale.pt(40.0))
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart
            .configure_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .label_style(scale.font(10.0))
            .bold_line_style(&GRID_COLOR)
            .light_line_style(&WHITE)
            .draw()?;

        let marker = scale.pt(1.5);
        let line_width = scale.pt(3.0);

        chart
            .draw_series(self.samples.points().map(|(x, y)| {
                Circle::new((x, y), marker, SAMPLE_COLOR.mix(SCATTER_ALPHA).filled())
            }))?
            .label("Sample Data")
            .legend(move |(x, y)| Circle::new((x, y), marker, SAMPLE_COLOR.filled()));

        if let Some(secondary) = self.secondary {
            chart
                .draw_series(secondary.points().map(|(x, y)| {
                    Circle::new((x, y), marker, FAILURE_COLOR.mix(SCATTER_ALPHA).filled())
                }))?
                .label("Failure Data")
                .legend(move |(x, y)| Circle::new((x, y), marker, FAILURE_COLOR.filled()));
        }

        let legend_len = scale.pt(20.0) as i32;

        chart
            .draw_series(LineSeries::new(
                self.curve.iter().copied(),
                CURVE_COLOR.stroke_width(line_width),
            ))?
            .label(self.curve_label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + legend_len, y)], CURVE_COLOR.stroke_width(line_width))
            });

        if let Some((percent, points)) = &self.cutoff {
            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    CUTOFF_COLOR.stroke_width(line_width),
                ))?
                .label(cutoff_legend(*percent))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], CUTOFF_COLOR.stroke_width(line_width))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .label_font(scale.font(10.0))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> OilSamples {
        OilSamples {
            rpm: vec![2000.0, 3000.0, 4000.0, 5000.0],
            oilp: vec![40.0, 55.0, 62.0, 67.0],
        }
    }

    #[test]
    fn legend_uses_two_decimals() {
        let p = FitParams::new(20.123, -1000.456, -90.0);
        assert_eq!(curve_legend(&p), "20.12 * ln(rpm + -1000.46) + -90.00");
        assert_eq!(cutoff_legend(70.0), "70% cutoff");
    }

    #[test]
    fn bounds_cover_every_layer() {
        let s = samples();
        let failure = OilSamples {
            rpm: vec![6000.0],
            oilp: vec![10.0],
        };
        let curve = vec![(2500.0, 50.0), (4999.0, 80.0)];
        let p = FitParams::new(1.0, 0.0, 0.0);
        let chart = FitChart::new(&s, Some(&failure), &p, &curve, Some(50.0));

        assert!(chart.x_bounds.0 < 2000.0 && chart.x_bounds.1 > 6000.0);
        assert!(chart.y_bounds.0 < 10.0 && chart.y_bounds.1 > 80.0);
        let (percent, cut) = chart.cutoff.as_ref().unwrap();
        assert_eq!(*percent, 50.0);
        assert_eq!(cut[1], (4999.0, 40.0));
    }
}
