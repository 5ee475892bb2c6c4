use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stats::CvSummary;

/// The single data row of `<name>_scores.csv`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScoreRow {
    #[serde(rename = "Train Score")]
    pub train_score: f64,
    #[serde(rename = "Avg CV Score")]
    pub avg_cv_score: f64,
    #[serde(rename = "Std")]
    pub std: f64,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Max")]
    pub max: f64,
}

impl ScoreRow {
    pub fn new(train_score: f64, cv: &CvSummary) -> Self {
        ScoreRow {
            train_score,
            avg_cv_score: cv.mean,
            std: cv.std,
            min: cv.min,
            max: cv.max,
        }
    }
}

/// One ranked row of `<name>_feat_imp.csv`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    #[serde(rename = "Feature")]
    pub feature: String,
    #[serde(rename = "Importance Score")]
    pub score: f64,
}

fn create_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    Ok(csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(BufWriter::new(file)))
}

/// Write the train score and CV summary as a one-row CSV.
pub fn write_scores<P: AsRef<Path>>(row: &ScoreRow, output_path: P) -> Result<()> {
    let path = output_path.as_ref();
    let mut writer = create_writer(path)?;
    writer.serialize(row)?;
    writer.flush()?;
    log::info!("Wrote scores to {:?}", path);
    Ok(())
}

/// Write ranked importances, one feature per row in the given order.
pub fn write_feature_importance<P: AsRef<Path>>(
    ranked: &[FeatureImportance],
    output_path: P,
) -> Result<()> {
    let path = output_path.as_ref();
    let mut writer = create_writer(path)?;
    if ranked.is_empty() {
        writer.write_record(["Feature", "Importance Score"])?;
    }
    for row in ranked {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} feature importances to {:?}", ranked.len(), path);
    Ok(())
}
