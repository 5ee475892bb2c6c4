//! Report outputs: CSV tables, the importance bar chart and the console summary.

pub mod console;
pub mod plots;
pub mod tables;

pub use console::{format_g, print_report, render_report};
pub use plots::{plot_feature_importance, write_plot};
pub use tables::{write_feature_importance, write_scores, FeatureImportance, ScoreRow};
