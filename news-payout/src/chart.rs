use crate::types::{AuthorCount, ChartKind};
use crate::utils::truncate_chars;

pub const PRIMARY_COLOR: &str = "#8884d8";
pub const SECONDARY_COLOR: &str = "#82ca9d";

const LABEL_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub name: String,
    pub count: usize,
    pub color: &'static str,
}

/// A chart projection of an aggregation. Building one never touches the
/// aggregation it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn total(&self) -> usize {
        self.points.iter().map(|p| p.count).sum()
    }
}

/// Pie slices alternate colors by index parity.
pub fn pie_color(index: usize) -> &'static str {
    if index % 2 == 0 {
        PRIMARY_COLOR
    } else {
        SECONDARY_COLOR
    }
}

pub fn project(kind: ChartKind, series: &[AuthorCount]) -> ChartSpec {
    let points = series
        .iter()
        .enumerate()
        .map(|(index, entry)| ChartPoint {
            name: entry.name.clone(),
            count: entry.count,
            color: match kind {
                ChartKind::Pie => pie_color(index),
                ChartKind::Line | ChartKind::Bar => PRIMARY_COLOR,
            },
        })
        .collect();

    ChartSpec { kind, points }
}

/// Draw the chart for a terminal, `width` columns for the plot area.
pub fn render_text(spec: &ChartSpec, width: usize) -> String {
    if spec.points.is_empty() {
        return "(no data)\n".to_string();
    }

    let max = spec.points.iter().map(|p| p.count).max().unwrap_or(1).max(1);
    let total = spec.total().max(1);
    let width = width.max(1);
    let mut out = String::new();

    for point in &spec.points {
        let label = format!(
            "{:<width$}",
            truncate_chars(&point.name, LABEL_WIDTH),
            width = LABEL_WIDTH
        );
        let scaled = (point.count * width).div_ceil(max);
        let line = match spec.kind {
            ChartKind::Bar => format!("{} | {} {}", label, "#".repeat(scaled), point.count),
            ChartKind::Line => format!(
                "{} | {}* {}",
                label,
                " ".repeat(scaled.saturating_sub(1)),
                point.count
            ),
            ChartKind::Pie => format!(
                "{} | {:>5.1}% {} ({})",
                label,
                point.count as f64 * 100.0 / total as f64,
                point.count,
                point.color
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }

    out
}
