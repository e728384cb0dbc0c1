//! Comparison-plot rendering for ensembles.
//!
//! Plots show the number of infectious people over time: every replicate
//! as a faint line, each source's median bold, one color per source
//! group so merged plots distinguish the source scenarios.

use std::path::Path;

use plotters::prelude::*;

use crate::ensemble::{Ensemble, MergedEnsemble};
use crate::error::WhatifError;
use crate::sim::Trajectory;

/// Fixed output resolution in pixels.
pub const PLOT_WIDTH: u32 = 3200;
pub const PLOT_HEIGHT: u32 = 2400;

/// Renders a single ensemble to a PNG at the fixed resolution.
///
/// # Errors
///
/// Returns `PlotError` when the backend cannot draw or write the image.
pub fn plot_ensemble<P: AsRef<Path>>(ensemble: &Ensemble, path: P) -> Result<(), WhatifError> {
    render(&[ensemble], &ensemble.config.label, path.as_ref())
}

/// Renders a merged ensemble as one comparison plot, colored per source.
///
/// # Errors
///
/// Returns `PlotError` when the backend cannot draw or write the image.
pub fn plot_merged<P: AsRef<Path>>(merged: &MergedEnsemble, path: P) -> Result<(), WhatifError> {
    let groups: Vec<&Ensemble> = merged.sources.iter().collect();
    render(&groups, "Scenario comparison", path.as_ref())
}

fn render(groups: &[&Ensemble], caption: &str, path: &Path) -> Result<(), WhatifError> {
    let max_day = groups
        .iter()
        .flat_map(|group| &group.replicates)
        .flat_map(|trajectory| trajectory.day.last().copied())
        .max()
        .unwrap_or(1);
    let max_infectious = groups
        .iter()
        .flat_map(|group| group.replicates.iter().chain(group.median.iter()))
        .flat_map(|trajectory| trajectory.n_infectious.iter().copied())
        .max()
        .unwrap_or(1)
        .max(1);

    let root = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(to_plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 80))
        .margin(40)
        .x_label_area_size(100)
        .y_label_area_size(160)
        .build_cartesian_2d(0..max_day, 0..max_infectious)
        .map_err(to_plot_error)?;

    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Number infectious")
        .label_style(("sans-serif", 40))
        .axis_desc_style(("sans-serif", 50))
        .draw()
        .map_err(to_plot_error)?;

    for (index, group) in groups.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();

        for trajectory in &group.replicates {
            chart
                .draw_series(LineSeries::new(
                    series_points(trajectory),
                    color.mix(0.25).stroke_width(2),
                ))
                .map_err(to_plot_error)?;
        }

        if let Some(median) = &group.median {
            chart
                .draw_series(LineSeries::new(
                    series_points(median),
                    color.stroke_width(8),
                ))
                .map_err(to_plot_error)?
                .label(group.config.label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 60, y)], color.stroke_width(8))
                });
        }
    }

    if groups.iter().any(|group| group.median.is_some()) {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 45))
            .draw()
            .map_err(to_plot_error)?;
    }

    root.present().map_err(to_plot_error)?;
    Ok(())
}

fn series_points(trajectory: &Trajectory) -> Vec<(u32, u64)> {
    trajectory
        .day
        .iter()
        .copied()
        .zip(trajectory.n_infectious.iter().copied())
        .collect()
}

fn to_plot_error<E: std::fmt::Display>(error: E) -> WhatifError {
    WhatifError::PlotError(error.to_string())
}
