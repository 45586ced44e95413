/// Radar chart of the submitted measurements, rendered as inline SVG.
///
/// One spoke per feature starting at twelve o'clock and running clockwise.
/// The radial axis spans `min(0, smallest value)` to the largest value, so
/// negative inputs still plot inside the chart.

use std::fmt::Write;

use crate::page::escape_html;

pub const CHART_TITLE: &str = "📈 Feature Radar Chart";

const SIZE: f64 = 420.0;
const CENTER: f64 = SIZE / 2.0;
const RADIUS: f64 = 150.0;
const GRID_RINGS: usize = 4;

/// Radial axis bounds for a set of values.
pub fn radial_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(0.0_f64, f64::min);
    let max = finite.fold(min, f64::max);
    if max - min <= f64::EPSILON {
        (min, min + 1.0)
    } else {
        (min, max)
    }
}

/// Cartesian position of `value` on spoke `index` of `count`.
fn point(index: usize, count: usize, value: f64, range: (f64, f64)) -> (f64, f64) {
    let fraction = if value.is_finite() {
        ((value - range.0) / (range.1 - range.0)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let angle = std::f64::consts::TAU * index as f64 / count as f64;
    let r = fraction * RADIUS;
    (CENTER + r * angle.sin(), CENTER - r * angle.cos())
}

/// Trims a tick value to at most two decimals without trailing zeros.
fn tick_label(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

/// Renders the chart. Returns an empty string for an empty series.
pub fn render_radar_svg(series: &[(&str, f64)]) -> String {
    if series.is_empty() {
        return String::new();
    }
    let count = series.len();
    let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
    let range = radial_range(&values);

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="radar" viewBox="0 0 {s} {s}" width="{s}" height="{s}" role="img" aria-label="{title}">"#,
        s = SIZE,
        title = escape_html(CHART_TITLE),
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="24" text-anchor="middle" class="radar-title">{}</text>"#,
        CENTER,
        escape_html(CHART_TITLE)
    );

    // Grid rings with radial tick labels along the first spoke.
    for ring in 1..=GRID_RINGS {
        let fraction = ring as f64 / GRID_RINGS as f64;
        let ring_points: Vec<String> = (0..count)
            .map(|i| {
                let tick = range.0 + fraction * (range.1 - range.0);
                let (x, y) = point(i, count, tick, range);
                format!("{:.2},{:.2}", x, y)
            })
            .collect();
        let _ = write!(
            svg,
            r##"<polygon points="{}" fill="none" stroke="#d0d7de" stroke-width="1"/>"##,
            ring_points.join(" ")
        );
        let _ = write!(
            svg,
            r##"<text x="{:.2}" y="{:.2}" class="radar-tick" font-size="10" fill="#57606a">{}</text>"##,
            CENTER + 4.0,
            CENTER - fraction * RADIUS,
            tick_label(range.0 + fraction * (range.1 - range.0))
        );
    }

    // Spokes and feature labels.
    for (i, (name, _)) in series.iter().enumerate() {
        let (x, y) = point(i, count, range.1, range);
        let _ = write!(
            svg,
            r##"<line x1="{c}" y1="{c}" x2="{:.2}" y2="{:.2}" stroke="#d0d7de" stroke-width="1"/>"##,
            x,
            y,
            c = CENTER
        );
        let angle = std::f64::consts::TAU * i as f64 / count as f64;
        let lx = CENTER + (RADIUS + 22.0) * angle.sin();
        let ly = CENTER - (RADIUS + 22.0) * angle.cos();
        let _ = write!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" dominant-baseline="middle" class="radar-label">{}</text>"#,
            lx,
            ly,
            escape_html(name)
        );
    }

    // Filled value polygon, closed back to the first point.
    let mut value_points: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let (x, y) = point(i, count, *v, range);
            format!("{:.2},{:.2}", x, y)
        })
        .collect();
    value_points.push(value_points[0].clone());
    let _ = write!(
        svg,
        r##"<polygon class="radar-values" points="{}" fill="#636efa" fill-opacity="0.5" stroke="#636efa" stroke-width="2"/>"##,
        value_points.join(" ")
    );

    svg.push_str("</svg>");
    svg
}
