use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::{classes, select_labels, FeatureTable};
use crate::error::EvalError;
use crate::models::classifier_trait::{ClassifierModel, Importance};
use crate::models::utils;
use crate::search::ParamValue;

type Tree = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Bagged ensemble of CART trees.
///
/// Every tree is fitted on a stratified bootstrap sample (each class is
/// resampled with replacement to its own size) so both classes reach every
/// tree. Probabilities are the mean of the trees' leaf votes and native
/// importances the mean of the trees' normalised impurity decreases.
///
/// Every split searches all features: smartcore keeps per-split feature
/// sampling crate-private, so the only randomness is the bootstrap.
pub struct BaggedTreesClassifier {
    params: ModelConfig,
    trees: Vec<Tree>,
    classes: Vec<i32>,
    n_features: usize,
}

impl BaggedTreesClassifier {
    pub fn new(params: ModelConfig) -> Self {
        BaggedTreesClassifier {
            params,
            trees: Vec::new(),
            classes: Vec::new(),
            n_features: 0,
        }
    }

    pub fn params(&self) -> &ModelConfig {
        &self.params
    }

    fn tree_params(&self) -> Result<(u16, DecisionTreeClassifierParameters), EvalError> {
        match &self.params.model_type {
            ModelType::BaggedTrees {
                n_trees,
                max_depth,
                min_samples_leaf,
                min_samples_split,
                criterion,
            } => {
                if *n_trees == 0 {
                    return Err(EvalError::InvalidParameter {
                        name: "n_trees".to_string(),
                        value: "0".to_string(),
                    });
                }
                let params = DecisionTreeClassifierParameters {
                    criterion: utils::parse_criterion(criterion)?,
                    max_depth: *max_depth,
                    min_samples_leaf: *min_samples_leaf,
                    min_samples_split: *min_samples_split,
                    seed: None,
                };
                Ok((*n_trees, params))
            }
            other => Err(EvalError::InvalidParameter {
                name: "model_type".to_string(),
                value: format!("{:?}", other),
            }),
        }
    }

    fn fitted(&self) -> Result<(), EvalError> {
        if self.trees.is_empty() {
            return Err(EvalError::NotFitted(self.name().to_string()));
        }
        Ok(())
    }
}

impl ClassifierModel for BaggedTreesClassifier {
    fn fit(&mut self, x: &FeatureTable, y: &[i32]) -> Result<()> {
        crate::data_handling::check_row_counts(x, y)?;
        let classes = classes(y);
        if classes.len() != 2 {
            return Err(EvalError::NotBinary(classes.len()).into());
        }
        let (n_trees, base) = self.tree_params()?;

        let members: Vec<Vec<usize>> = classes
            .iter()
            .map(|c| (0..y.len()).filter(|&i| y[i] == *c).collect())
            .collect();

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut trees = Vec::with_capacity(n_trees as usize);
        for t in 0..n_trees {
            let sample: Vec<usize> = members
                .iter()
                .flat_map(|m| {
                    (0..m.len())
                        .map(|_| m[rng.gen_range(0..m.len())])
                        .collect::<Vec<_>>()
                })
                .collect();

            let xs = x.matrix().select_rows(&sample).to_dense()?;
            let ys = select_labels(y, &sample);
            let params = DecisionTreeClassifierParameters {
                seed: Some(self.params.seed.wrapping_add(t as u64)),
                ..base.clone()
            };
            trees.push(Tree::fit(&xs, &ys, params).map_err(EvalError::from)?);
        }

        log::debug!(
            "Fitted {} trees on {} rows x {} features",
            trees.len(),
            x.nrows(),
            x.ncols()
        );

        self.trees = trees;
        self.classes = classes;
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &FeatureTable) -> Result<Vec<i32>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .into_iter()
            .map(|p| if p > 0.5 { self.classes[1] } else { self.classes[0] })
            .collect())
    }

    fn predict_proba(&self, x: &FeatureTable) -> Result<Vec<f64>> {
        self.fitted()?;
        let dense = x.matrix().to_dense()?;
        let mut proba = vec![0.0f64; x.nrows()];
        for tree in &self.trees {
            let votes = tree.predict_proba(&dense).map_err(EvalError::from)?;
            for (i, p) in proba.iter_mut().enumerate() {
                *p += *votes.get((i, 1));
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in proba.iter_mut() {
            *p /= n_trees;
        }
        Ok(proba)
    }

    fn importance(&self) -> Option<Importance> {
        if self.trees.is_empty() {
            return None;
        }
        let mut total = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            let imp = tree.compute_feature_importances(false);
            let sum: f64 = imp.iter().sum();
            if sum > 0.0 {
                for (t, v) in total.iter_mut().zip(&imp) {
                    *t += v / sum;
                }
            }
        }
        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for t in total.iter_mut() {
                *t /= sum;
            }
        }
        Some(Importance::Native(total))
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        let ModelType::BaggedTrees {
            n_trees,
            max_depth,
            min_samples_leaf,
            min_samples_split,
            criterion,
        } = &mut self.params.model_type
        else {
            return Err(EvalError::UnknownParameter {
                model: "bagged_trees".to_string(),
                name: name.to_string(),
            }
            .into());
        };

        match name {
            "n_trees" | "n_estimators" => *n_trees = utils::as_u16(name, value)?,
            "max_depth" => *max_depth = utils::as_optional_u16(name, value)?,
            "min_samples_leaf" => *min_samples_leaf = utils::as_usize(name, value)?,
            "min_samples_split" => *min_samples_split = utils::as_usize(name, value)?,
            "criterion" => {
                let text = utils::as_text(name, value)?;
                utils::parse_criterion(&text)?;
                *criterion = text;
            }
            "seed" | "random_state" => self.params.seed = utils::as_u64(name, value)?,
            _ => {
                return Err(EvalError::UnknownParameter {
                    model: "bagged_trees".to_string(),
                    name: name.to_string(),
                }
                .into())
            }
        }

        self.trees.clear();
        self.classes.clear();
        Ok(())
    }

    fn clone_unfitted(&self) -> Box<dyn ClassifierModel> {
        Box::new(BaggedTreesClassifier::new(self.params.clone()))
    }

    fn name(&self) -> &str {
        "bagged_trees"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Array2;

    fn separable() -> (FeatureTable, Vec<i32>) {
        // Second feature separates the classes, the first is noise
        let rows = vec![
            vec![0.3, 0.1],
            vec![0.9, 0.2],
            vec![0.1, 0.15],
            vec![0.5, 0.05],
            vec![0.7, 0.25],
            vec![0.2, 0.9],
            vec![0.8, 0.8],
            vec![0.4, 0.95],
            vec![0.6, 0.85],
            vec![0.0, 0.75],
        ];
        let x = Array2::from_rows(rows).unwrap();
        let table = FeatureTable::new(vec!["noise".into(), "signal".into()], x).unwrap();
        (table, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1])
    }

    fn bagged() -> BaggedTreesClassifier {
        BaggedTreesClassifier::new(ModelConfig::new(
            7,
            ModelType::BaggedTrees {
                n_trees: 10,
                max_depth: Some(3),
                min_samples_leaf: 1,
                min_samples_split: 2,
                criterion: "gini".to_string(),
            },
        ))
    }

    #[test]
    fn test_bagged_trees_classifier() {
        let (x, y) = separable();
        let mut model = bagged();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert_eq!(proba.len(), y.len());
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(model.predict(&x).unwrap(), y);

        match model.importance() {
            Some(Importance::Native(imp)) => {
                assert_eq!(imp.len(), 2);
                assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
                assert!(imp[1] > imp[0], "signal should dominate: {:?}", imp);
            }
            other => panic!("expected native importances, got {:?}", other),
        }
    }

    #[test]
    fn same_seed_gives_same_probabilities() {
        let (x, y) = separable();
        let mut a = bagged();
        let mut b = bagged();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let (x, _) = separable();
        let model = bagged();
        assert!(model.predict_proba(&x).is_err());
        assert!(model.importance().is_none());
    }

    #[test]
    fn set_param_updates_config_and_rejects_unknown_names() {
        let mut model = bagged();
        model.set_param("max_depth", &ParamValue::Null).unwrap();
        model.set_param("n_estimators", &ParamValue::Int(5)).unwrap();
        match &model.params().model_type {
            ModelType::BaggedTrees { n_trees, max_depth, .. } => {
                assert_eq!(*n_trees, 5);
                assert_eq!(*max_depth, None);
            }
            other => panic!("unexpected model type {:?}", other),
        }
        assert!(model.set_param("alpha", &ParamValue::Float(1.0)).is_err());
        assert!(model.set_param("criterion", &ParamValue::Text("mse".into())).is_err());
    }
}
