use anyhow::Result;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::{classes, FeatureTable};
use crate::error::EvalError;
use crate::models::classifier_trait::{ClassifierModel, Importance};
use crate::models::utils;
use crate::search::ParamValue;

type Fitted = LogisticRegression<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// L2-regularised binary logistic regression.
///
/// Exposes its coefficients as a single row, so it pairs with
/// `linear_model = true` in the evaluation config.
pub struct LogisticRegressionClassifier {
    params: ModelConfig,
    weights: Option<Weights>,
}

/// Coefficients and intercept copied out of the fitted smartcore model.
#[derive(Debug, Clone)]
struct Weights {
    coefficients: Vec<f64>,
    intercept: f64,
    classes: Vec<i32>,
}

impl LogisticRegressionClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticRegressionClassifier {
            params,
            weights: None,
        }
    }

    pub fn params(&self) -> &ModelConfig {
        &self.params
    }

    fn alpha(&self) -> Result<f64, EvalError> {
        match &self.params.model_type {
            ModelType::LogisticRegression { alpha } if *alpha >= 0.0 && alpha.is_finite() => {
                Ok(*alpha)
            }
            ModelType::LogisticRegression { alpha } => Err(EvalError::InvalidParameter {
                name: "alpha".to_string(),
                value: alpha.to_string(),
            }),
            other => Err(EvalError::InvalidParameter {
                name: "model_type".to_string(),
                value: format!("{:?}", other),
            }),
        }
    }

    fn weights(&self) -> Result<&Weights, EvalError> {
        self.weights
            .as_ref()
            .ok_or_else(|| EvalError::NotFitted(self.name().to_string()))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ClassifierModel for LogisticRegressionClassifier {
    fn fit(&mut self, x: &FeatureTable, y: &[i32]) -> Result<()> {
        crate::data_handling::check_row_counts(x, y)?;
        let n_classes = classes(y).len();
        if n_classes != 2 {
            return Err(EvalError::NotBinary(n_classes).into());
        }

        let params = LogisticRegressionParameters::default().with_alpha(self.alpha()?);
        let dense = x.matrix().to_dense()?;
        let labels = y.to_vec();
        let fitted = Fitted::fit(&dense, &labels, params).map_err(EvalError::from)?;

        let coefficients: Vec<f64> = (0..x.ncols())
            .map(|j| *fitted.coefficients().get((0, j)))
            .collect();
        let weights = Weights {
            coefficients,
            intercept: *fitted.intercept().get((0, 0)),
            classes: fitted.classes().clone(),
        };
        log::debug!(
            "Fitted logistic regression: intercept {:.4}, coefficients {:?}",
            weights.intercept,
            weights.coefficients
        );

        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, x: &FeatureTable) -> Result<Vec<i32>> {
        let classes = &self.weights()?.classes;
        let proba = self.predict_proba(x)?;
        Ok(proba
            .into_iter()
            .map(|p| if p > 0.5 { classes[1] } else { classes[0] })
            .collect())
    }

    fn predict_proba(&self, x: &FeatureTable) -> Result<Vec<f64>> {
        let w = self.weights()?;
        if x.ncols() != w.coefficients.len() {
            return Err(EvalError::FeatureNameCount {
                expected: w.coefficients.len(),
                actual: x.ncols(),
            }
            .into());
        }
        let m = x.matrix();
        Ok((0..m.nrows())
            .map(|r| {
                let z: f64 = m
                    .row_slice(r)
                    .iter()
                    .zip(&w.coefficients)
                    .map(|(v, c)| v * c)
                    .sum();
                sigmoid(z + w.intercept)
            })
            .collect())
    }

    fn importance(&self) -> Option<Importance> {
        self.weights
            .as_ref()
            .map(|w| Importance::Coefficients(vec![w.coefficients.clone()]))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match (&mut self.params.model_type, name) {
            (ModelType::LogisticRegression { alpha }, "alpha") => {
                let v = utils::as_f64(name, value)?;
                if v < 0.0 {
                    return Err(EvalError::InvalidParameter {
                        name: name.to_string(),
                        value: value.to_string(),
                    }
                    .into());
                }
                *alpha = v;
            }
            (_, "seed" | "random_state") => self.params.seed = utils::as_u64(name, value)?,
            _ => {
                return Err(EvalError::UnknownParameter {
                    model: "logistic_regression".to_string(),
                    name: name.to_string(),
                }
                .into())
            }
        }
        self.weights = None;
        Ok(())
    }

    fn clone_unfitted(&self) -> Box<dyn ClassifierModel> {
        Box::new(LogisticRegressionClassifier::new(self.params.clone()))
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (FeatureTable, Vec<i32>) {
        let x = FeatureTable::from_columns(vec![
            ("a", vec![-2.0, -1.5, -1.0, -0.5, 0.4, 0.9, 1.4, 2.1]),
            ("b", vec![0.3, -0.2, 0.1, 0.0, -0.1, 0.2, -0.3, 0.1]),
        ])
        .unwrap();
        (x, vec![0, 0, 0, 0, 1, 1, 1, 1])
    }

    fn logreg(alpha: f64) -> LogisticRegressionClassifier {
        LogisticRegressionClassifier::new(ModelConfig::new(
            42,
            ModelType::LogisticRegression { alpha },
        ))
    }

    #[test]
    fn test_logistic_regression_classifier() {
        let (x, y) = table();
        let mut model = logreg(0.1);
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[..4].iter().all(|&p| p < 0.5));
        assert!(proba[4..].iter().all(|&p| p > 0.5));
        assert_eq!(model.predict(&x).unwrap(), y);

        match model.importance() {
            Some(Importance::Coefficients(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].len(), 2);
                assert!(rows[0][0] > 0.0);
                assert!(rows[0][0].abs() > rows[0][1].abs());
            }
            other => panic!("expected coefficients, got {:?}", other),
        }
    }

    #[test]
    fn set_param_clears_fit() {
        let (x, y) = table();
        let mut model = logreg(0.1);
        model.fit(&x, &y).unwrap();
        model.set_param("alpha", &ParamValue::Int(2)).unwrap();
        assert!(model.importance().is_none());
        assert_eq!(
            model.params().model_type,
            ModelType::LogisticRegression { alpha: 2.0 }
        );
        assert!(model.set_param("max_depth", &ParamValue::Int(2)).is_err());
        assert!(model.set_param("alpha", &ParamValue::Float(-1.0)).is_err());
    }

    #[test]
    fn single_class_labels_are_rejected() {
        let (x, _) = table();
        let mut model = logreg(0.1);
        assert!(model.fit(&x, &[1; 8]).is_err());
    }
}
