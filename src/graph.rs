use crate::report::{ChartKind, ChartSpec};
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

/// Rendering options for chart generation
///
/// The chart content itself comes from a [`ChartSpec`]; these are the knobs
/// of the drawing surface.
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Render a chart specification to PNG bytes
///
/// This is the entry point for the report's chart images. It draws through a
/// file-based bitmap backend into a temporary file and reads the result back.
///
/// # Arguments
/// * `spec` - The chart to draw
/// * `options` - Image dimensions
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
pub fn render_chart(spec: &ChartSpec, options: &GraphOptions) -> Result<Vec<u8>, Box<dyn Error>> {
    let tmp = tempfile::Builder::new().suffix(".png").tempfile()?;

    match spec.kind {
        ChartKind::Bar => draw_bar_chart(spec, options, tmp.path())?,
        ChartKind::Line => draw_line_chart(spec, options, tmp.path())?,
        ChartKind::Pie => draw_pie_chart(spec, options, tmp.path())?,
    }

    let buffer = std::fs::read(tmp.path())?;
    Ok(buffer)
}

fn label_at(labels: &[String], index: i32) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| labels.get(i))
        .cloned()
        .unwrap_or_default()
}

fn max_value(values: &[f64]) -> f64 {
    values.iter().cloned().fold(0.0, f64::max)
}

/// Draws one vertical bar per value over labeled categories
///
/// # Implementation Notes
/// * Axes scale from zero to the largest value plus one
/// * Uses blue bars with solid fill
fn draw_bar_chart(
    spec: &ChartSpec,
    options: &GraphOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_range = 0.0..max_value(&spec.values) + 1.0;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d((0..spec.labels.len() as i32).into_segmented(), y_range)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(i) => label_at(&spec.labels, *i),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(spec.values.iter().enumerate().map(|(i, v)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), *v),
            ],
            BLUE.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Draws values connected by a line, one point per labeled category
fn draw_line_chart(
    spec: &ChartSpec,
    options: &GraphOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = 0..(spec.values.len() as i32 - 1).max(1);
    let y_range = 0.0..max_value(&spec.values) + 1.0;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(spec.labels.len())
        .x_label_formatter(&|x| label_at(&spec.labels, *x))
        .draw()?;

    chart.draw_series(LineSeries::new(
        spec.values.iter().enumerate().map(|(i, v)| (i as i32, *v)),
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

/// Draws one slice per value, sized proportionally
///
/// # Implementation Notes
/// * An all-zero table has no slices to size, so only the title is drawn
fn draw_pie_chart(
    spec: &ChartSpec,
    options: &GraphOptions,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&spec.title, ("sans-serif", 30))?;

    let total: f64 = spec.values.iter().sum();
    if total <= 0.0 {
        root.present()?;
        return Ok(());
    }

    let dims = root.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
    let radius = f64::from(dims.0.min(dims.1)) * 0.35;

    const PALETTE: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];
    let colors: Vec<RGBColor> = (0..spec.values.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &spec.values, &colors, &spec.labels);
    pie.label_style(("sans-serif", 18).into_font());
    pie.percentages(("sans-serif", 14).into_font());

    root.draw(&pie)?;
    root.present()?;
    Ok(())
}
