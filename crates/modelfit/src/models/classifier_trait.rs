use anyhow::Result;

use crate::data_handling::FeatureTable;
use crate::search::ParamValue;

/// What a fitted model reports about its features.
#[derive(Debug, Clone, PartialEq)]
pub enum Importance {
    /// Importances computed by the model itself (tree impurity decrease).
    Native(Vec<f64>),
    /// Linear coefficients, one row per class.
    Coefficients(Vec<Vec<f64>>),
}

/// Contract for the classifiers the evaluator drives.
///
/// Labels are binary `i32` values; probabilities are for the larger label.
/// The evaluator never fits the caller's instance: it works on
/// [`ClassifierModel::clone_unfitted`] copies.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on every row of `x`.
    fn fit(&mut self, x: &FeatureTable, y: &[i32]) -> Result<()>;

    /// Predict class labels.
    fn predict(&self, x: &FeatureTable) -> Result<Vec<i32>>;

    /// Predict the probability of the positive (larger) class.
    fn predict_proba(&self, x: &FeatureTable) -> Result<Vec<f64>>;

    /// Per-feature importances of the fitted model, if it has any.
    fn importance(&self) -> Option<Importance>;

    /// Set one hyper-parameter by name. Clears any fitted state.
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()>;

    /// A fresh, unfitted copy with the same hyper-parameters.
    fn clone_unfitted(&self) -> Box<dyn ClassifierModel>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
