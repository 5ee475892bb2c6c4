use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Central configuration for the classifiers in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Seed for any sampling the model does while fitting.
    pub seed: u64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    BaggedTrees {
        n_trees: u16,
        max_depth: Option<u16>,
        min_samples_leaf: usize,
        min_samples_split: usize,
        criterion: String,
    },
    LogisticRegression {
        alpha: f64,
    },
}

impl ModelType {
    /// Whether importances come from coefficients rather than the model itself.
    pub fn is_linear(&self) -> bool {
        matches!(self, ModelType::LogisticRegression { .. })
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::BaggedTrees {
            n_trees: 50,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            criterion: "gini".to_string(),
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bagged_trees" | "bagging" => Ok(ModelType::default()),
            "logistic_regression" | "logreg" => Ok(ModelType::LogisticRegression { alpha: 1.0 }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: bagged_trees, logistic_regression",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(seed: u64, model_type: ModelType) -> Self {
        Self { seed, model_type }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            model_type: ModelType::default(),
        }
    }
}

/// Score used to rank grid-search candidates.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchScoring {
    /// Mean held-out accuracy.
    #[default]
    Accuracy,
    /// Mean held-out ROC AUC.
    RocAuc,
}

/// Options for one evaluation run.
///
/// `output_dir` has no default: every report file lands where the caller
/// says, and the directory must already exist.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    /// File stem for `<name>_scores.csv`, `<name>_feat_imp.csv` and the plot.
    pub report_name: String,
    pub output_dir: PathBuf,
    #[serde(default = "default_true")]
    pub run_cross_validation: bool,
    #[serde(default = "default_true")]
    pub report_feature_importance: bool,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// Rescale by column std before fitting and rank by |coefficient|.
    #[serde(default)]
    pub linear_model: bool,
    #[serde(default)]
    pub search_scoring: SearchScoring,
    /// Threads for grid search; `None` uses the global rayon pool.
    #[serde(default)]
    pub n_jobs: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_cv_folds() -> usize {
    5
}

impl EvaluationConfig {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(report_name: S, output_dir: P) -> Self {
        Self {
            report_name: report_name.into(),
            output_dir: output_dir.into(),
            run_cross_validation: true,
            report_feature_importance: true,
            cv_folds: default_cv_folds(),
            linear_model: false,
            search_scoring: SearchScoring::default(),
            n_jobs: None,
        }
    }

    /// Load an evaluation config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        let config: EvaluationConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
        Ok(config)
    }

    pub fn scores_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_scores.csv", self.report_name))
    }

    pub fn importance_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_feat_imp.csv", self.report_name))
    }

    pub fn plot_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_feat_imp.html", self.report_name))
    }

    /// Whether this run writes anything to `output_dir`.
    pub fn writes_files(&self) -> bool {
        self.run_cross_validation || self.report_feature_importance
    }
}
