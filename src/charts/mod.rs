//! Chart rendering for the three aggregation results.
//!
//! Bar charts are drawn with the [`plotters`] bitmap backend and saved
//! as PNG files. The backend's built-in sans-serif rendering keeps the
//! binary usable in headless environments (Docker/CI) without system
//! font configuration.

use crate::models::{AgeBracket, AgeBracketCounts, HourlyCounts, NightAreaCounts};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during chart generation.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save chart to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid chart data: {0}")]
    InvalidData(String),
}

type Result<T> = std::result::Result<T, ChartError>;

/// Y-axis ceiling with ~10% headroom so the tallest bar never touches
/// the chart frame.
fn axis_max(max_count: u64) -> u64 {
    max_count + max_count / 10 + 1
}

/// Render the incidents-per-hour bar chart.
///
/// One bar per hour 0..=23; the peak hour's bar is drawn in red, the
/// rest in translucent blue.
pub fn render_hourly_chart(
    counts: &HourlyCounts,
    size: (u32, u32),
    output_path: &Path,
) -> Result<()> {
    let (peak_hour, _) = counts.peak();
    let y_max = axis_max(counts.iter().map(|(_, count)| count).max().unwrap_or(0));

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Incident Frequency by Hour of Day", ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(0i32..24i32, 0u64..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Hour of Day (24-Hour Format)")
        .y_desc("Number of Incidents")
        .x_labels(24)
        .disable_x_mesh()
        .label_style(("sans-serif", 20))
        .axis_desc_style(("sans-serif", 26))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(counts.iter().map(|(hour, count)| {
            let style = if hour == peak_hour {
                RED.filled()
            } else {
                BLUE.mix(0.6).filled()
            };
            Rectangle::new([(hour as i32, 0u64), (hour as i32 + 1, count)], style)
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    debug!("Wrote hourly chart to {}", output_path.display());
    Ok(())
}

/// Render the top-N night-incident areas as horizontal bars.
///
/// The busiest area sits at the top of the chart and is drawn in red;
/// the remaining areas use a lighter shade.
pub fn render_night_area_chart(
    counts: &NightAreaCounts,
    top_n: usize,
    size: (u32, u32),
    output_path: &Path,
) -> Result<()> {
    let top = counts.top(top_n);
    if top.is_empty() {
        return Err(ChartError::InvalidData(
            "No night-window areas to plot".to_string(),
        ));
    }

    let rows = top.len() as i32;
    let x_max = axis_max(top.iter().map(|(_, count)| *count).max().unwrap_or(0));

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let caption = format!("Top {} Areas by Night Incidents (10 PM - 3:59 AM)", top.len());
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(220)
        .build_cartesian_2d(0u64..x_max, 0i32..rows)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    // Row 0 is drawn at the top: chart rows count down from rows - 1.
    let area_labels: Vec<&str> = top.iter().map(|(area, _)| area.as_str()).collect();
    chart
        .configure_mesh()
        .x_desc("Number of Night Incidents")
        .y_labels(top.len())
        .y_label_formatter(&|y| {
            area_labels
                .get((rows - 1 - *y) as usize)
                .map(|area| area.to_string())
                .unwrap_or_default()
        })
        .disable_y_mesh()
        .label_style(("sans-serif", 20))
        .axis_desc_style(("sans-serif", 26))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(top.iter().enumerate().map(|(index, (_, count))| {
            let style = if index == 0 {
                RED.filled()
            } else {
                RED.mix(0.45).filled()
            };
            let row = rows - 1 - index as i32;
            Rectangle::new([(0u64, row), (*count, row + 1)], style)
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    debug!("Wrote night area chart to {}", output_path.display());
    Ok(())
}

/// Render the victim-age-bracket bar chart.
pub fn render_age_chart(
    counts: &AgeBracketCounts,
    size: (u32, u32),
    output_path: &Path,
) -> Result<()> {
    let y_max = axis_max(counts.iter().map(|(_, count)| count).max().unwrap_or(0));
    let brackets = AgeBracket::ALL.len() as i32;

    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Incidents by Victim Age Group", ("sans-serif", 36))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(0i32..brackets, 0u64..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Age Group")
        .y_desc("Number of Incidents")
        .x_labels(AgeBracket::ALL.len())
        .x_label_formatter(&|x| {
            AgeBracket::ALL
                .get(*x as usize)
                .map(|bracket| bracket.label().to_string())
                .unwrap_or_default()
        })
        .disable_x_mesh()
        .label_style(("sans-serif", 20))
        .axis_desc_style(("sans-serif", 26))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(counts.iter().map(|(bracket, count)| {
            let x = bracket.index() as i32;
            Rectangle::new([(x, 0u64), (x + 1, count)], GREEN.mix(0.7).filled())
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    debug!("Wrote age distribution chart to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_max_adds_headroom() {
        assert_eq!(axis_max(0), 1);
        assert_eq!(axis_max(9), 10);
        assert_eq!(axis_max(100), 111);
        assert_eq!(axis_max(1000), 1101);
    }

    #[test]
    fn empty_night_counts_are_invalid_data() {
        let counts = NightAreaCounts::new(Vec::new());
        let err = render_night_area_chart(
            &counts,
            10,
            (1200, 800),
            Path::new("/tmp/unused.png"),
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::InvalidData(_)));
    }
}
