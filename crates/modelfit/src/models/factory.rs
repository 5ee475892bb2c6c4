use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::logistic::LogisticRegressionClassifier;
use crate::models::bagged_trees::BaggedTreesClassifier;

/// Build a boxed, unfitted classifier from a `ModelConfig`.
pub fn build_model(params: ModelConfig) -> Box<dyn ClassifierModel> {
    match params.model_type {
        ModelType::BaggedTrees { .. } => Box::new(BaggedTreesClassifier::new(params)),
        ModelType::LogisticRegression { .. } => {
            Box::new(LogisticRegressionClassifier::new(params))
        }
    }
}
