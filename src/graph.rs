use crate::error::{DashboardError, Result};
use plotters::prelude::*;
use std::ops::Range;

pub const GREEN_BAR: RGBColor = RGBColor(0, 128, 0);
pub const SKYBLUE_BAR: RGBColor = RGBColor(135, 206, 235);
pub const ORANGE_BAR: RGBColor = RGBColor(255, 165, 0);
pub const PURPLE_BAR: RGBColor = RGBColor(128, 0, 128);
pub const BLUE_BAR: RGBColor = RGBColor(0, 0, 255);
pub const LIGHTBLUE_BAR: RGBColor = RGBColor(173, 216, 230);
pub const SALMON_BAR: RGBColor = RGBColor(250, 128, 114);

/// Colors handed out to the series of a stacked chart, in order
const SERIES_PALETTE: [RGBColor; 10] = [
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

/// Half the width of a category slot taken up by its bars
const BAR_HALF_WIDTH: f64 = 0.4;

/// Configuration options for chart generation
///
/// This structure contains the labels and size of one chart.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the left Y-axis
    pub y_label: String,

    /// Label for the right Y-axis of dual-axis charts
    pub secondary_y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            secondary_y_label: String::new(),
            width: 1000,
            height: 600,
        }
    }
}

/// One named run of bar heights, one value per category
#[derive(Clone, Debug)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
    pub color: RGBColor,
}

impl BarSeries {
    pub fn new(name: impl Into<String>, values: Vec<f64>, color: RGBColor) -> Self {
        Self {
            name: name.into(),
            values,
            color,
        }
    }
}

/// Color of the `index`-th series of a stacked chart
pub fn series_color(index: usize) -> RGBColor {
    SERIES_PALETTE[index % SERIES_PALETTE.len()]
}

/// Draw a single-axis bar chart as an SVG document
///
/// `labels[i]` names the bar of height `values[i]`. Non-finite values are
/// drawn as empty slots.
///
/// # Examples
/// ```
/// use fuel_dashboard::graph::{ChartOptions, GREEN_BAR, bar_chart};
///
/// let labels = vec!["B 1".to_string(), "B 2".to_string()];
/// let svg = bar_chart(&labels, &[20.0, 5.0], GREEN_BAR, &ChartOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn bar_chart(
    labels: &[String],
    values: &[f64],
    color: RGBColor,
    options: &ChartOptions,
) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(category_axis(labels), 0f64..axis_max(values))
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v: &f64| category_label(labels, *v))
            .y_label_formatter(&|v: &f64| format_tick(*v))
            .x_desc(options.x_label.as_str())
            .y_desc(options.y_label.as_str())
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, finite_or_zero(*v))],
                    color.filled(),
                )
            }))
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(svg)
}

/// Draw two series side by side, each against its own Y-axis
///
/// The primary series sits on the left half of each slot and is scaled by
/// the left axis; the secondary series on the right half, scaled by the
/// right axis labelled `options.secondary_y_label`.
pub fn dual_axis_bar_chart(
    labels: &[String],
    primary: &BarSeries,
    secondary: &BarSeries,
    options: &ChartOptions,
) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .right_y_label_area_size(80)
            .build_cartesian_2d(category_axis(labels), 0f64..axis_max(&primary.values))
            .map_err(draw_error)?
            .set_secondary_coord(category_axis(labels), 0f64..axis_max(&secondary.values));

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v: &f64| category_label(labels, *v))
            .y_label_formatter(&|v: &f64| format_tick(*v))
            .x_desc(options.x_label.as_str())
            .y_desc(options.y_label.as_str())
            .draw()
            .map_err(draw_error)?;

        chart
            .configure_secondary_axes()
            .y_label_formatter(&|v: &f64| format_tick(*v))
            .y_desc(options.secondary_y_label.as_str())
            .draw()
            .map_err(draw_error)?;

        let primary_color = primary.color;
        chart
            .draw_series(primary.values.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x, finite_or_zero(*v))],
                    primary_color.filled(),
                )
            }))
            .map_err(draw_error)?
            .label(primary.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], primary_color.filled()));

        let secondary_color = secondary.color;
        chart
            .draw_secondary_series(secondary.values.iter().enumerate().map(|(i, v)| {
                let x = i as f64;
                Rectangle::new(
                    [(x, 0.0), (x + BAR_HALF_WIDTH, finite_or_zero(*v))],
                    secondary_color.filled(),
                )
            }))
            .map_err(draw_error)?
            .label(secondary.name.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], secondary_color.filled())
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(svg)
}

/// Draw series stacked on top of each other, one bar per category
pub fn stacked_bar_chart(
    labels: &[String],
    series: &[BarSeries],
    options: &ChartOptions,
) -> Result<String> {
    let totals: Vec<f64> = (0..labels.len())
        .map(|i| {
            series
                .iter()
                .filter_map(|s| s.values.get(i))
                .map(|v| finite_or_zero(*v))
                .sum()
        })
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(category_axis(labels), 0f64..axis_max(&totals))
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&|v: &f64| category_label(labels, *v))
            .y_label_formatter(&|v: &f64| format_tick(*v))
            .x_desc(options.x_label.as_str())
            .y_desc(options.y_label.as_str())
            .draw()
            .map_err(draw_error)?;

        let mut bases = vec![0f64; labels.len()];
        for s in series {
            let color = s.color;
            let bars: Vec<Rectangle<(f64, f64)>> = s
                .values
                .iter()
                .zip(bases.iter_mut())
                .enumerate()
                .map(|(i, (v, base))| {
                    let x = i as f64;
                    let bottom = *base;
                    *base += finite_or_zero(*v);
                    Rectangle::new(
                        [(x - BAR_HALF_WIDTH, bottom), (x + BAR_HALF_WIDTH, *base)],
                        color.filled(),
                    )
                })
                .collect();

            chart
                .draw_series(bars)
                .map_err(draw_error)?
                .label(s.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        if !series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
    }
    Ok(svg)
}

// One unit per category, centred on integer positions; ticks between
// categories get an empty label from `category_label`
fn category_axis(labels: &[String]) -> Range<f64> {
    let slots = labels.len().max(1) as f64;
    -0.5..slots - 0.5
}

fn category_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

// Top of the value axis: the largest finite value plus headroom
fn axis_max(values: &[f64]) -> f64 {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if magnitude >= 1e4 {
        format!("{:.0}K", value / 1e3)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn draw_error(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Chart(err.to_string())
}
