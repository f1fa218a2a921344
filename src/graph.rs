use crate::error::{DashboardError, Result};
use plotters::prelude::*;
use std::ops::Range;

/// Available graph types supported by the report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphType {
    /// One line per series, points joined in year order
    Line,

    /// One bar per year; stacked series sit on top of each other and
    /// overlay series are drawn from zero over the stack
    StackedBar,
}

/// Configuration options for graph generation
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,

    /// Type of graph to generate
    pub graph_type: GraphType,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            x_label: "Year".to_string(),
            y_label: String::new(),
            width: 640,
            height: 400,
            graph_type: GraphType::Line,
        }
    }
}

/// One named, coloured set of (year, value) points
///
/// Points keep one slot per source row, blank values included, so stacked
/// bars built from the same rows line up slot by slot.
#[derive(Clone, Debug)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    pub points: Vec<(f64, Option<f64>)>,
    /// Fill opacity for bars, ignored by line graphs
    pub opacity: f64,
    /// Whether bars stack on the series before them or start from zero
    pub stacked: bool,
}

impl Series {
    pub fn new(label: impl Into<String>, color: RGBColor) -> Self {
        Self {
            label: label.into(),
            color,
            points: Vec::new(),
            opacity: 1.0,
            stacked: true,
        }
    }

    /// Collects one point per row that has a year
    pub fn from_rows<R>(
        label: impl Into<String>,
        color: RGBColor,
        rows: &[R],
        year: impl Fn(&R) -> Option<i32>,
        value: impl Fn(&R) -> Option<f64>,
    ) -> Self {
        let mut series = Self::new(label, color);
        series.points = rows
            .iter()
            .filter_map(|r| year(r).map(|y| (f64::from(y), value(r))))
            .collect();
        series
    }

    /// Points with a value, in slot order
    pub fn values(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().filter_map(|&(x, y)| y.map(|y| (x, y)))
    }

    /// Draws this series from zero with the given opacity
    pub fn overlay(mut self, opacity: f64) -> Self {
        self.stacked = false;
        self.opacity = opacity;
        self
    }
}

/// Renders the series as an SVG document
///
/// The chart always carries a legend with one entry per series. Series
/// without points still get a legend entry; a graph with no points at all
/// draws empty axes.
///
/// # Examples
/// ```
/// use fsa_dashboard::graph::{create_graph, GraphOptions, Series};
/// use plotters::style::BLUE;
///
/// let mut revenue = Series::new("Revenue", BLUE);
/// revenue.points = vec![(2020.0, Some(10.0)), (2021.0, Some(12.5))];
///
/// let svg = create_graph(&[revenue], &GraphOptions::default()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// assert!(svg.contains("Revenue"));
/// ```
pub fn create_graph(series: &[Series], options: &GraphOptions) -> Result<String> {
    match options.graph_type {
        GraphType::Line => create_line_graph(series, options),
        GraphType::StackedBar => create_stacked_bar_graph(series, options),
    }
}

fn draw_err(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Chart(err.to_string())
}

/// Axis range covering `values`, widened so it is never empty
fn axis_range(values: impl Iterator<Item = f64>, pad: f64, include_zero: bool) -> Range<f64> {
    let (mut lo, mut hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if lo > hi {
        return 0.0..1.0;
    }
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if lo == hi {
        return lo - 1.0..hi + 1.0;
    }
    let margin = (hi - lo) * pad;
    lo - margin..hi + margin
}

fn year_label(x: &f64) -> String {
    if x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        String::new()
    }
}

/// Creates a line graph
///
/// Points of each series are sorted by year before drawing so rows that
/// arrive out of order still produce a readable line.
fn create_line_graph(series: &[Series], options: &GraphOptions) -> Result<String> {
    let all_points = || series.iter().flat_map(|s| s.values());
    let x_range = axis_range(all_points().map(|p| p.0), 0.0, false);
    let y_range = axis_range(all_points().map(|p| p.1), 0.05, false);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&year_label)
            .draw()
            .map_err(draw_err)?;

        for s in series {
            let mut points: Vec<(f64, f64)> = s.values().collect();
            points.sort_by(|a, b| a.0.total_cmp(&b.0));
            let color = s.color;

            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .map_err(draw_err)?
                .label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}

/// A bar segment in data coordinates: x centre, bottom and top
type Segment = (f64, f64, f64);

/// Lays out bar segments for every series
///
/// Stacked series build one stack per row slot: each segment starts where
/// the previous stacked series ended in the same slot. Once a stacked value
/// is blank the rest of that slot's stack is not drawn. Overlay series
/// always start from zero.
fn bar_segments(series: &[Series]) -> Vec<Vec<Segment>> {
    let mut tops: Vec<Option<f64>> = Vec::new();

    series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .enumerate()
                .filter_map(|(slot, &(x, y))| {
                    if !s.stacked {
                        return y.map(|y| (x, 0.0, y));
                    }
                    if tops.len() <= slot {
                        tops.resize(slot + 1, Some(0.0));
                    }
                    let bottom = tops[slot];
                    let top = bottom.zip(y).map(|(b, v)| b + v);
                    tops[slot] = top;
                    bottom.zip(top).map(|(bottom, top)| (x, bottom, top))
                })
                .collect()
        })
        .collect()
}

/// Creates a bar graph with stacked and overlaid series
fn create_stacked_bar_graph(series: &[Series], options: &GraphOptions) -> Result<String> {
    const HALF_WIDTH: f64 = 0.4;

    let segments = bar_segments(series);
    let all_segments = || segments.iter().flatten();
    let x_range = {
        let r = axis_range(all_segments().map(|s| s.0), 0.0, false);
        r.start - 0.5..r.end + 0.5
    };
    let y_range = axis_range(
        all_segments().flat_map(|&(_, bottom, top)| [bottom, top]),
        0.05,
        true,
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&year_label)
            .draw()
            .map_err(draw_err)?;

        for (s, segs) in series.iter().zip(&segments) {
            let style = s.color.mix(s.opacity).filled();

            chart
                .draw_series(segs.iter().map(|&(x, bottom, top)| {
                    Rectangle::new(
                        [
                            (x - HALF_WIDTH, bottom.max(top)),
                            (x + HALF_WIDTH, bottom.min(top)),
                        ],
                        style,
                    )
                }))
                .map_err(draw_err)?
                .label(s.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}
