//! SVG line charts of table columns

use crate::error::{FinanceError, Result};
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (1024, 640);
/// Upper bound of labelled x positions
const MAX_X_LABELS: usize = 12;

/// A labelled value; points are plotted in order at x = 0, 1, 2, ...
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// File-system safe name for a chart title
pub fn sanitize_file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "chart".to_string()
    } else {
        stem.to_string()
    }
}

/// Render `points` as a line chart with point markers and save it as SVG
pub fn render_line_chart(
    path: &Path,
    title: &str,
    y_label: &str,
    points: &[ChartPoint],
) -> Result<()> {
    if points.is_empty() {
        return Err(FinanceError::ChartError("no data points to plot".to_string()));
    }

    let (low, high) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value), hi.max(p.value))
        });
    let pad = if (high - low).abs() < f64::EPSILON {
        high.abs().max(1.0) * 0.1
    } else {
        (high - low) * 0.1
    };
    let last_x = points.len().saturating_sub(1) as f64;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(24)
        .x_label_area_size(64)
        .y_label_area_size(96)
        .build_cartesian_2d(-0.5..last_x + 0.5, (low - pad)..(high + pad))
        .map_err(chart_error)?;

    let label_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        points
            .get(index as usize)
            .map(|p| p.label.clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_labels(points.len().min(MAX_X_LABELS))
        .x_label_formatter(&label_at)
        .y_desc(y_label)
        .draw()
        .map_err(chart_error)?;

    let coords = || points.iter().enumerate().map(|(i, p)| (i as f64, p.value));
    chart
        .draw_series(LineSeries::new(coords(), &BLUE))
        .map_err(chart_error)?;
    chart
        .draw_series(coords().map(|xy| Circle::new(xy, 4, BLUE.filled())))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn chart_error<E: std::fmt::Debug>(err: E) -> FinanceError {
    FinanceError::ChartError(format!("{err:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Current Ratio 2023"), "Current_Ratio_2023");
        assert_eq!(sanitize_file_stem("../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_file_stem("  "), "chart");
    }

    #[test]
    fn test_render_writes_svg() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ratio.svg");
        let points = vec![
            ChartPoint {
                label: "AAPL 2022-09-30".to_string(),
                value: 0.88,
            },
            ChartPoint {
                label: "AAPL 2023-09-30".to_string(),
                value: 0.99,
            },
        ];

        render_line_chart(&path, "Current ratio", "CurrentRatio", &points).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Current ratio"));
    }

    #[test]
    fn test_single_point_renders() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("one.svg");
        let points = vec![ChartPoint {
            label: "META 2023-12-31".to_string(),
            value: 0.0,
        }];

        render_line_chart(&path, "One", "TotalDebt", &points).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_empty_points_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = render_line_chart(&tmp.path().join("x.svg"), "x", "y", &[]).unwrap_err();
        assert!(matches!(err, FinanceError::ChartError(_)));
    }
}
