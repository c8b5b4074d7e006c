use crate::core::presenter::ChartSpec;
use crate::utils::format::format_money;

pub const DEFAULT_CHART_WIDTH: usize = 40;

/// Horizontal bar rendering of the series. The scale starts at the series
/// minimum rather than zero so year-over-year growth stays visible.
pub fn render_chart(chart: &ChartSpec, width: usize) -> String {
    let width = width.max(1);
    let mut out = format!("{}\n{}\n", chart.title, chart.dataset_label);

    if chart.points.is_empty() {
        out.push_str("(sin datos)\n");
        return out;
    }

    let min = chart
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::INFINITY, f64::min);
    let max = chart
        .points
        .iter()
        .map(|p| p.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let label_width = chart
        .points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    for point in &chart.points {
        let filled = if span > 0.0 {
            1 + ((point.value - min) / span * (width - 1) as f64).round() as usize
        } else {
            width
        };
        out.push_str(&format!(
            "{:<lw$} │{:<w$}│ {}\n",
            point.label,
            "█".repeat(filled.min(width)),
            format_money(point.value),
            lw = label_width,
            w = width,
        ));
    }
    out
}
