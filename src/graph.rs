use anyhow::{bail, Context, Result};
use image::ImageEncoder;
use indexmap::IndexSet;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::ops::Range;

use crate::coerce::to_number;
use crate::config::{ChartKind, Configuration};
use crate::palette::{self, parse_color};
use crate::series::{CategoricalSeries, PairedSeries, Series, VolumetricSeries};
use crate::value::Value;
use crate::{OutputFormat, RenderOptions};

const MARKER_SIZE: i32 = 5;
const BAR_WIDTH: f64 = 0.8;
const SMOOTH_STEPS: usize = 8;

/// Title shown above the chart for the given configuration.
pub fn chart_title(config: &Configuration) -> String {
    let mut title = match config.chart_kind {
        ChartKind::Categorical => format!("Pie Chart of {}", config.x_field),
        kind => format!("{} of {}", display_name(kind).to_uppercase(), config.x_field),
    };
    if config.has_y() {
        let suffix = match config.chart_kind {
            ChartKind::Categorical => format!(" (sized by {})", config.y_field),
            _ => format!(" vs {}", config.y_field),
        };
        title.push_str(&suffix);
    }
    title
}

fn display_name(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Point => "scatter",
        ChartKind::Line => "line",
        ChartKind::Bar => "bar",
        ChartKind::Categorical => "pie",
        ChartKind::Volumetric => "3d",
    }
}

/// Draw the first series of a collection and encode it.
///
/// The configuration only supplies the title and axis names; the series is
/// drawn as given.
pub fn render(series: &[Series], config: &Configuration, options: &RenderOptions) -> Result<Vec<u8>> {
    let Some(series) = series.first() else {
        bail!("Nothing to render: no series for the selected axes");
    };
    if options.width == 0 || options.height == 0 {
        bail!("Image size must be non-zero (got {}x{})", options.width, options.height);
    }
    let size = (options.width, options.height);

    log::info!(
        "Rendering {} series with {} entries at {}x{}",
        series.kind(),
        series.len(),
        options.width,
        options.height
    );

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; options.width as usize * options.height as usize * 3];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
                draw(&root, series, config)?;
                root.present().context("Failed to present drawing")?;
            }
            encode_png(&buffer, options.width, options.height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                draw(&root, series, config)?;
                root.present().context("Failed to present drawing")?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes)
        .write_image(buffer, width, height, image::ColorType::Rgb8)
        .context("Failed to encode PNG")?;
    Ok(png_bytes)
}

fn draw<DB>(root: &DrawingArea<DB, Shift>, series: &Series, config: &Configuration) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&parse_color(palette::PAPER_COLOR))
        .context("Failed to fill background")?;

    let title = chart_title(config);
    match series {
        Series::Point(s) => draw_paired(root, s, ChartKind::Point, &title, config),
        Series::Line(s) => draw_paired(root, s, ChartKind::Line, &title, config),
        Series::Bar(s) => draw_paired(root, s, ChartKind::Bar, &title, config),
        Series::Categorical(s) => draw_pie(root, s, &title),
        Series::Volumetric(s) => draw_volumetric(root, s, &title),
    }
}

/// Plot positions for x values: numeric when every value is a finite
/// number, otherwise one slot per distinct label in first-seen order.
#[derive(Debug, Clone, PartialEq)]
struct XAxis {
    positions: Vec<f64>,
    categories: Option<Vec<String>>,
}

fn x_axis(xs: &[Value], force_categorical: bool) -> XAxis {
    let numeric: Option<Vec<f64>> = if force_categorical {
        None
    } else {
        xs.iter()
            .map(|x| to_number(x).filter(|n| n.is_finite()))
            .collect()
    };

    match numeric {
        Some(positions) => XAxis { positions, categories: None },
        None => {
            let mut categories = IndexSet::new();
            let positions = xs
                .iter()
                .map(|x| categories.insert_full(x.to_label()).0 as f64)
                .collect();
            XAxis {
                positions,
                categories: Some(categories.into_iter().collect()),
            }
        }
    }
}

/// Data range with 5% padding, widened by one unit on each side when flat.
fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn draw_paired<DB>(
    root: &DrawingArea<DB, Shift>,
    series: &PairedSeries,
    kind: ChartKind,
    title: &str,
    config: &Configuration,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let axis = x_axis(&series.xs, kind == ChartKind::Bar);

    // Infinite magnitudes are valid numbers but have no plot position.
    let points: Vec<(f64, f64)> = axis
        .positions
        .iter()
        .copied()
        .zip(series.ys.iter().copied())
        .filter(|(_, y)| y.is_finite())
        .collect();
    if points.is_empty() {
        bail!("No finite values to plot");
    }

    let x_range = match &axis.categories {
        Some(categories) => -0.5..(categories.len() as f64 - 0.5),
        None => padded_range(points.iter().map(|p| p.0)),
    };
    let y_range = if kind == ChartKind::Bar {
        padded_range(points.iter().map(|p| p.1).chain(std::iter::once(0.0)))
    } else {
        padded_range(points.iter().map(|p| p.1))
    };

    let text = parse_color(palette::TEXT_COLOR);
    let grid = parse_color(palette::GRID_COLOR);
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(title, ("sans-serif", 22).into_font().color(&text))
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    let categories = axis.categories.clone().unwrap_or_default();
    let formatter = |x: &f64| category_label(&categories, *x);
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(config.x_field.as_str())
        .y_desc(config.y_field.as_str())
        .light_line_style(grid)
        .bold_line_style(grid);
    if axis.categories.is_some() {
        mesh.x_labels(categories.len()).x_label_formatter(&formatter);
    }
    mesh.draw().context("Failed to draw mesh")?;

    let marker = parse_color(palette::MARKER_COLOR);
    let outline = parse_color(palette::OUTLINE_COLOR);

    match kind {
        ChartKind::Bar => {
            let fill = parse_color(palette::BAR_COLOR).mix(0.8).filled();
            chart
                .draw_series(points.iter().map(|&(x, y)| {
                    Rectangle::new([(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)], fill)
                }))
                .context("Failed to draw bars")?;
        }
        ChartKind::Line => {
            chart
                .draw_series(LineSeries::new(smooth_path(&points), marker.stroke_width(3)))
                .context("Failed to draw line series")?;
            draw_markers(&mut chart, &points, marker, outline)?;
        }
        _ => draw_markers(&mut chart, &points, marker, outline)?,
    }

    Ok(())
}

fn draw_markers<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    points: &[(f64, f64)],
    fill: RGBColor,
    outline: RGBColor,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, MARKER_SIZE, fill.mix(0.8).filled())))
        .context("Failed to draw point series")?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, MARKER_SIZE, outline.stroke_width(1))))
        .context("Failed to draw point outlines")?;
    Ok(())
}

/// Catmull-Rom spline through the points, in the order given.
fn smooth_path(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut path = Vec::with_capacity(last * SMOOTH_STEPS + 1);
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];
        for step in 0..SMOOTH_STEPS {
            let t = step as f64 / SMOOTH_STEPS as f64;
            path.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    path.push(points[last]);
    path
}

fn catmull_rom(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), t: f64) -> (f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let blend = |a: f64, b: f64, c: f64, d: f64| {
        0.5 * (2.0 * b + (c - a) * t + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2 + (3.0 * b - a - 3.0 * c + d) * t3)
    };
    (blend(p0.0, p1.0, p2.0, p3.0), blend(p0.1, p1.1, p2.1, p3.1))
}

fn draw_pie<DB>(root: &DrawingArea<DB, Shift>, series: &CategoricalSeries, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    // Slices need a positive share of the whole.
    let (labels, sizes): (Vec<&str>, Vec<f64>) = series
        .labels
        .iter()
        .zip(&series.magnitudes)
        .filter(|(_, m)| m.is_finite() && **m > 0.0)
        .map(|(l, m)| (l.as_str(), *m))
        .unzip();
    if sizes.is_empty() {
        bail!("No positive magnitudes to draw");
    }

    let text = parse_color(palette::TEXT_COLOR);
    let area = root
        .titled(title, ("sans-serif", 22).into_font().color(&text))
        .context("Failed to draw title")?;

    // Pie coordinates are absolute backend pixels.
    let (w, h) = area.dim_in_pixel();
    let (base_x, base_y) = area.get_base_pixel();
    let center = (base_x + w as i32 / 2, base_y + h as i32 / 2);
    let radius = w.min(h) as f64 * 0.35;
    let colors = palette::category_colors(sizes.len());

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.donut_hole(radius * 0.3);
    pie.label_style(("sans-serif", 16).into_font().color(&text));
    pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
    area.draw(&pie).context("Failed to draw pie")?;

    Ok(())
}

fn draw_volumetric<DB>(root: &DrawingArea<DB, Shift>, series: &VolumetricSeries, title: &str) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let axis = x_axis(&series.xs, false);
    let points: Vec<(f64, f64, f64)> = axis
        .positions
        .iter()
        .zip(&series.ys)
        .zip(&series.zs)
        .filter(|((_, y), _)| y.is_finite())
        .map(|((&x, &y), &z)| (x, y, z as f64))
        .collect();
    if points.is_empty() {
        bail!("No finite values to plot");
    }

    let x_range = match &axis.categories {
        Some(categories) => -0.5..(categories.len() as f64 - 0.5),
        None => padded_range(points.iter().map(|p| p.0)),
    };
    let y_range = padded_range(points.iter().map(|p| p.1));
    let z_range = padded_range(points.iter().map(|p| p.2));
    let (y_min, y_max) = (y_range.start, y_range.end);

    let text = parse_color(palette::TEXT_COLOR);
    let mut chart = ChartBuilder::on(root)
        .margin(20)
        .caption(title, ("sans-serif", 22).into_font().color(&text))
        .build_cartesian_3d(x_range, y_range, z_range)
        .context("Failed to build 3D chart")?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart.configure_axes().draw().context("Failed to draw axes")?;

    // Marker colour follows y, as on a colour scale.
    chart
        .draw_series(points.iter().map(|&(x, y, z)| {
            let t = (y - y_min) / (y_max - y_min);
            Circle::new((x, y, z), MARKER_SIZE, palette::viridis(t).mix(0.8).filled())
        }))
        .context("Failed to draw 3D points")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::value::record;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    #[test]
    fn test_chart_titles() {
        let pie = Configuration::new("region", ChartKind::Categorical);
        assert_eq!(chart_title(&pie), "Pie Chart of region");
        assert_eq!(chart_title(&pie.with_y("sales")), "Pie Chart of region (sized by sales)");
        let scatter = Configuration::new("h", ChartKind::Point).with_y("w");
        assert_eq!(chart_title(&scatter), "SCATTER of h vs w");
        let cube = Configuration::new("h", ChartKind::Volumetric);
        assert_eq!(chart_title(&cube), "3D of h");
    }

    #[test]
    fn test_x_axis_numeric_and_categorical() {
        let numeric = x_axis(&[Value::from(2.0), Value::from("3")], false);
        assert_eq!(numeric.positions, vec![2.0, 3.0]);
        assert!(numeric.categories.is_none());

        let labels = x_axis(&[Value::from("b"), Value::from(1.0), Value::from("b")], false);
        assert_eq!(labels.positions, vec![0.0, 1.0, 0.0]);
        assert_eq!(labels.categories, Some(vec!["b".to_string(), "1".to_string()]));

        let forced = x_axis(&[Value::from(5.0)], true);
        assert_eq!(forced.categories, Some(vec!["5".to_string()]));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([3.0, 3.0]), 2.0..4.0);
        assert_eq!(padded_range([0.0, 10.0]), -0.5..10.5);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn test_category_label() {
        let cats = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(&cats, 1.0), "b");
        assert_eq!(category_label(&cats, 0.5), "");
        assert_eq!(category_label(&cats, 7.0), "");
        assert_eq!(category_label(&cats, -1.0), "");
    }

    #[test]
    fn test_smooth_path_passes_through_points() {
        let points = [(0.0, 0.0), (1.0, 2.0), (2.0, 1.0), (3.0, 3.0)];
        let path = smooth_path(&points);
        assert_eq!(path.len(), 3 * SMOOTH_STEPS + 1);
        assert_eq!(path[0], points[0]);
        assert_eq!(path[SMOOTH_STEPS], points[1]);
        assert_eq!(*path.last().unwrap(), points[3]);
    }

    #[test]
    fn test_render_empty_is_error() {
        let config = Configuration::new("a", ChartKind::Point).with_y("b");
        assert!(render(&[], &config, &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_render_each_kind_to_png() {
        let data = vec![
            record([("a", Value::from(1.0)), ("b", Value::from(4.0)), ("c", Value::from("x"))]),
            record([("a", Value::from(2.0)), ("b", Value::from(1.0)), ("c", Value::from("y"))]),
            record([("a", Value::from(3.0)), ("b", Value::from(3.0)), ("c", Value::from("x"))]),
        ];
        let options = RenderOptions { width: 320, height: 240, format: OutputFormat::Png };
        for kind in ChartKind::ALL {
            let x = if kind == ChartKind::Categorical { "c" } else { "a" };
            let config = Configuration::new(x, kind).with_y("b");
            let series = evaluate(Some(data.as_slice()), &config);
            let png = render(&series, &config, &options).unwrap();
            assert!(is_valid_png(&png), "{kind} did not produce a PNG");
        }
    }

    #[test]
    fn test_render_svg() {
        let data = vec![record([("a", 1i64), ("b", 2)])];
        let config = Configuration::new("a", ChartKind::Bar).with_y("b");
        let series = evaluate(Some(data.as_slice()), &config);
        let options = RenderOptions { width: 200, height: 150, format: OutputFormat::Svg };
        let svg = String::from_utf8(render(&series, &config, &options).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }
}
