use std::path::Path;

use anyhow::{Context, Result};
use plotly::layout::{Axis, Layout};
use plotly::{Bar, Plot};

use crate::report::tables::FeatureImportance;

/// Bar chart of ranked importances, features in the order given.
pub fn plot_feature_importance(ranked: &[FeatureImportance], title: &str) -> Plot {
    let names: Vec<String> = ranked.iter().map(|r| r.feature.clone()).collect();
    let scores: Vec<f64> = ranked.iter().map(|r| r.score).collect();

    let trace = Bar::new(names, scores).name("Importance");

    let layout = Layout::new()
        .title(title)
        .y_axis(Axis::new().title("Feature Importance Score"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Render `plot` as a standalone HTML page at `output_path`.
pub fn write_plot<P: AsRef<Path>>(plot: &Plot, output_path: P) -> Result<()> {
    let path = output_path.as_ref();
    // `Plot::write_html` panics on I/O failure
    std::fs::write(path, plot.to_html())
        .with_context(|| format!("Failed to write plot: {:?}", path))?;
    log::info!("Wrote feature importance plot to {:?}", path);
    Ok(())
}
