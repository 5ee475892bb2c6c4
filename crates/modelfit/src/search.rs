//! Exhaustive hyper-parameter search over a grid of candidate values.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::SearchScoring;
use crate::data_handling::{positive_class, select_labels, FeatureTable, Fold};
use crate::error::EvalError;
use crate::models::classifier_trait::ClassifierModel;
use crate::stats::{accuracy, roc_auc};

/// A single hyper-parameter value as it appears in a grid.
///
/// Deserialises from plain JSON scalars: `true`, `3`, `0.5`, `"gini"`, `null`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
            ParamValue::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// One point of a grid: parameter name to value.
pub type ParamSet = BTreeMap<String, ParamValue>;

/// Render a parameter set as `{a: 1, b: gini}`.
pub fn format_params(params: &ParamSet) -> String {
    let inner: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

/// Candidate values per hyper-parameter name.
///
/// Keys are kept sorted, which fixes the enumeration order of
/// [`ParameterGrid::candidates`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ParameterGrid(BTreeMap<String, Vec<ParamValue>>);

impl ParameterGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one parameter and its candidate values.
    pub fn with<S, V>(mut self, name: S, values: Vec<V>) -> Self
    where
        S: Into<String>,
        V: Into<ParamValue>,
    {
        self.0
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, values: Vec<ParamValue>) {
        self.0.insert(name.into(), values);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Cartesian product of all candidate values, last key varying fastest.
    pub fn candidates(&self) -> Result<Vec<ParamSet>, EvalError> {
        let mut acc: Vec<ParamSet> = vec![ParamSet::new()];
        for (name, values) in &self.0 {
            if values.is_empty() {
                return Err(EvalError::EmptyParameterValues(name.clone()));
            }
            let mut next = Vec::with_capacity(acc.len() * values.len());
            for partial in &acc {
                for value in values {
                    let mut set = partial.clone();
                    set.insert(name.clone(), value.clone());
                    next.push(set);
                }
            }
            acc = next;
        }
        Ok(acc)
    }

    /// Load a grid such as `{"max_depth": [2, null], "n_trees": [10, 50]}`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read parameter grid: {}", path.as_ref().display())
        })?;
        let grid: ParameterGrid = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse parameter grid: {}", path.as_ref().display())
        })?;
        Ok(grid)
    }
}

/// Cross-validated score of one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateResult {
    pub params: ParamSet,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
}

/// Result of a search: the winning parameters and a model refitted on all rows.
pub struct SearchOutcome {
    pub best_params: ParamSet,
    pub best_score: f64,
    pub best_estimator: Box<dyn ClassifierModel>,
    pub results: Vec<CandidateResult>,
}

/// Strategy for choosing hyper-parameters.
pub trait HyperparameterSearch {
    fn search(
        &self,
        base: &dyn ClassifierModel,
        features: &FeatureTable,
        labels: &[i32],
        folds: &[Fold],
    ) -> Result<SearchOutcome>;
}

/// Exhaustive search over every point of a [`ParameterGrid`].
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub grid: ParameterGrid,
    pub scoring: SearchScoring,
    /// Worker threads; `None` runs on the global rayon pool.
    pub n_jobs: Option<usize>,
}

impl GridSearch {
    pub fn new(grid: ParameterGrid) -> Self {
        GridSearch {
            grid,
            scoring: SearchScoring::default(),
            n_jobs: None,
        }
    }

    pub fn with_scoring(mut self, scoring: SearchScoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: Option<usize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    fn configure(base: &dyn ClassifierModel, params: &ParamSet) -> Result<Box<dyn ClassifierModel>> {
        let mut model = base.clone_unfitted();
        for (name, value) in params {
            model.set_param(name, value)?;
        }
        Ok(model)
    }

    fn score_candidate(
        &self,
        base: &dyn ClassifierModel,
        params: &ParamSet,
        features: &FeatureTable,
        labels: &[i32],
        folds: &[Fold],
        positive: i32,
    ) -> Result<CandidateResult> {
        let configured = Self::configure(base, params)?;
        let mut fold_scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let mut model = configured.clone_unfitted();
            model.fit(
                &features.select_rows(&fold.train),
                &select_labels(labels, &fold.train),
            )?;

            let test_x = features.select_rows(&fold.test);
            let test_y = select_labels(labels, &fold.test);
            let score = match self.scoring {
                SearchScoring::Accuracy => accuracy(&test_y, &model.predict(&test_x)?),
                SearchScoring::RocAuc => {
                    roc_auc(&test_y, &model.predict_proba(&test_x)?, positive)?
                }
            };
            fold_scores.push(score);
        }

        let mean_score = fold_scores.iter().mean();
        log::debug!(
            "Candidate {} scored {:.4} ({:?})",
            format_params(params),
            mean_score,
            fold_scores
        );
        Ok(CandidateResult {
            params: params.clone(),
            fold_scores,
            mean_score,
        })
    }

    fn score_all(
        &self,
        base: &dyn ClassifierModel,
        candidates: &[ParamSet],
        features: &FeatureTable,
        labels: &[i32],
        folds: &[Fold],
        positive: i32,
    ) -> Result<Vec<CandidateResult>> {
        candidates
            .par_iter()
            .map(|params| self.score_candidate(base, params, features, labels, folds, positive))
            .collect::<Result<Vec<_>>>()
    }
}

impl HyperparameterSearch for GridSearch {
    fn search(
        &self,
        base: &dyn ClassifierModel,
        features: &FeatureTable,
        labels: &[i32],
        folds: &[Fold],
    ) -> Result<SearchOutcome> {
        let candidates = self.grid.candidates()?;
        let positive = positive_class(labels)?;
        log::info!(
            "Grid search over {} candidates x {} folds ({:?})",
            candidates.len(),
            folds.len(),
            self.scoring
        );

        let results = match self.n_jobs {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .context("Failed to build grid search thread pool")?
                .install(|| self.score_all(base, &candidates, features, labels, folds, positive))?,
            None => self.score_all(base, &candidates, features, labels, folds, positive)?,
        };

        // Results are in candidate order; a later candidate must be strictly
        // better to replace the current best.
        let mut best_idx = 0;
        for (i, r) in results.iter().enumerate().skip(1) {
            let best = results[best_idx].mean_score;
            if r.mean_score > best || (best.is_nan() && !r.mean_score.is_nan()) {
                best_idx = i;
            }
        }
        let best = &results[best_idx];
        log::info!(
            "Best parameters {} with mean score {:.4}",
            format_params(&best.params),
            best.mean_score
        );

        let mut best_estimator = Self::configure(base, &best.params)?;
        best_estimator.fit(features, labels)?;

        Ok(SearchOutcome {
            best_params: best.params.clone(),
            best_score: best.mean_score,
            best_estimator,
            results,
        })
    }
}
