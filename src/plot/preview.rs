//! Preview chart of a loaded log: every channel as a line against time.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::LogTable;
use crate::plot::{Chart, Scale, padded_range};

pub const X_LABEL: &str = "Time [s]";

/// Matplotlib's default cycle, so previews look like the familiar ones.
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub struct PreviewChart<'a> {
    pub table: &'a LogTable,
    pub x_bounds: (f64, f64),
    pub y_bounds: (f64, f64),
}

impl<'a> PreviewChart<'a> {
    pub fn new(table: &'a LogTable) -> Self {
        let x_bounds = padded_range(table.time.iter().copied()).unwrap_or((0.0, 1.0));
        let y_bounds = padded_range(
            table
                .channels
                .iter()
                .flat_map(|c| c.values.iter().copied()),
        )
        .unwrap_or((0.0, 1.0));
        Self {
            table,
            x_bounds,
            y_bounds,
        }
    }

    /// Line color of the `idx`-th channel.
    pub fn color(idx: usize) -> RGBColor {
        PALETTE[idx % PALETTE.len()]
    }
}

impl Chart for PreviewChart<'_> {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>, scale: &Scale) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let (x0, x1) = self.x_bounds;
        let (y0, y1) = self.y_bounds;

        let mut chart = ChartBuilder::on(root)
            .margin(scale.pt(8.0))
            .x_label_area_size(scale.pt(30.0))
            .y_label_area_size(scale.pt(40.0))
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart
            .configure_mesh()
            .x_desc(X_LABEL)
            .label_style(scale.font(10.0))
            .draw()?;

        let width = scale.pt(1.5);
        let legend_len = scale.pt(20.0) as i32;

        for (idx, channel) in self.table.channels.iter().enumerate() {
            let color = Self::color(idx);
            let series = self
                .table
                .time
                .iter()
                .copied()
                .zip(channel.values.iter().copied());

            chart
                .draw_series(LineSeries::new(series, color.stroke_width(width)))?
                .label(channel.label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], color.stroke_width(width))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(scale.font(10.0))
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}
