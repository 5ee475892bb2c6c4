use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::EvaluationConfig;
use crate::data_handling::{
    check_row_counts, positive_class, select_labels, stratified_folds, FeatureTable, Fold,
};
use crate::error::EvalError;
use crate::models::classifier_trait::{ClassifierModel, Importance};
use crate::preprocessing::scale_by_std;
use crate::report::{self, FeatureImportance, ScoreRow};
use crate::search::{GridSearch, HyperparameterSearch, ParamSet, ParameterGrid};
use crate::stats::{accuracy, roc_auc, CvSummary};

/// What one call to [`evaluate`] measured and wrote.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub train_auc: f64,
    pub train_accuracy: f64,
    /// Per-fold AUC, empty when cross-validation was skipped.
    pub cv_scores: Vec<f64>,
    pub cv: Option<CvSummary>,
    pub best_params: Option<ParamSet>,
    pub best_search_score: Option<f64>,
    /// Features ranked by descending importance.
    pub importances: Option<Vec<FeatureImportance>>,
    pub written: Vec<PathBuf>,
}

/// Fit `model` (or the best grid-search candidate), score it and write the
/// report files requested by `config`.
///
/// The caller's `model` is never fitted; work happens on unfitted clones.
/// Every check that can fail without fitting runs first, and files are only
/// written once every score and importance has been computed, so an `Err`
/// leaves `output_dir` untouched.
///
/// # Arguments
///
/// * `model` - Estimator template, possibly already fitted.
/// * `features` - Named feature columns, one row per sample.
/// * `labels` - Binary class label per row.
/// * `param_grid` - Candidate hyper-parameters; `None` or empty fits `model` as is.
/// * `config` - Report name, output directory and which steps to run.
pub fn evaluate(
    model: &dyn ClassifierModel,
    features: &FeatureTable,
    labels: &[i32],
    param_grid: Option<&ParameterGrid>,
    config: &EvaluationConfig,
) -> Result<EvaluationSummary> {
    check_row_counts(features, labels)?;
    let positive = positive_class(labels)?;

    let grid = param_grid.filter(|g| !g.is_empty());
    let folds: Option<Vec<Fold>> = if config.run_cross_validation || grid.is_some() {
        Some(stratified_folds(labels, config.cv_folds)?)
    } else {
        None
    };
    if config.writes_files() && !config.output_dir.is_dir() {
        return Err(EvalError::OutputDir(config.output_dir.clone()).into());
    }

    log::info!(
        "Evaluating '{}' as {} on {} rows x {} features",
        config.report_name,
        model.name(),
        features.nrows(),
        features.ncols()
    );

    let scaled;
    let features = if config.linear_model {
        scaled = scale_by_std(features)?;
        &scaled
    } else {
        features
    };

    // Adopt either the refitted best candidate or a fresh fit of `model`.
    let (estimator, best_params, best_search_score) = match (grid, folds.as_deref()) {
        (Some(grid), Some(folds)) => {
            let search = GridSearch::new(grid.clone())
                .with_scoring(config.search_scoring)
                .with_n_jobs(config.n_jobs);
            let outcome = search.search(model, features, labels, folds)?;
            (
                outcome.best_estimator,
                Some(outcome.best_params),
                Some(outcome.best_score),
            )
        }
        _ => {
            let mut fitted = model.clone_unfitted();
            fitted.fit(features, labels)?;
            (fitted, None, None)
        }
    };

    let train_proba = estimator.predict_proba(features)?;
    let train_pred = estimator.predict(features)?;
    let train_auc = roc_auc(labels, &train_proba, positive)?;
    let train_accuracy = accuracy(labels, &train_pred);
    log::info!(
        "Train AUC {:.4}, train accuracy {:.4}",
        train_auc,
        train_accuracy
    );

    let cv_scores = match (config.run_cross_validation, folds.as_deref()) {
        (true, Some(folds)) => cross_validate(estimator.as_ref(), features, labels, folds, positive)?,
        _ => Vec::new(),
    };
    let cv = CvSummary::from_scores(&cv_scores);

    let importances = if config.report_feature_importance {
        Some(rank_importances(
            estimator.as_ref(),
            features.names(),
            config.linear_model,
        )?)
    } else {
        None
    };

    let mut written = Vec::new();
    if let Some(cv) = &cv {
        let path = config.scores_path();
        report::write_scores(&ScoreRow::new(train_auc, cv), &path)?;
        written.push(path);
    }
    if let Some(ranked) = &importances {
        let csv_path = config.importance_path();
        report::write_feature_importance(ranked, &csv_path)?;
        written.push(csv_path);

        let plot_path = config.plot_path();
        let plot = report::plot_feature_importance(ranked, "Feature Importance");
        report::write_plot(&plot, &plot_path)?;
        written.push(plot_path);
    }

    report::print_report(train_auc, cv.as_ref());

    Ok(EvaluationSummary {
        train_auc,
        train_accuracy,
        cv_scores,
        cv,
        best_params,
        best_search_score,
        importances,
        written,
    })
}

/// AUC on each held-out fold, fitting a fresh clone of `estimator` per fold.
pub fn cross_validate(
    estimator: &dyn ClassifierModel,
    features: &FeatureTable,
    labels: &[i32],
    folds: &[Fold],
    positive: i32,
) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(folds.len());
    for (i, fold) in folds.iter().enumerate() {
        let mut model = estimator.clone_unfitted();
        model.fit(
            &features.select_rows(&fold.train),
            &select_labels(labels, &fold.train),
        )?;
        let test_y = select_labels(labels, &fold.test);
        let proba = model.predict_proba(&features.select_rows(&fold.test))?;
        let auc = roc_auc(&test_y, &proba, positive).map_err(|e| match e {
            EvalError::UndefinedAuc { context } => EvalError::UndefinedAuc {
                context: format!("fold {}: {}", i, context),
            },
            other => other,
        })?;
        log::debug!("Fold {} AUC {:.4}", i, auc);
        scores.push(auc);
    }
    Ok(scores)
}

/// Pair importances with feature names and sort by descending score.
///
/// Linear models are ranked by the absolute value of their first coefficient
/// row. Equal scores keep their column order.
pub fn rank_importances(
    estimator: &dyn ClassifierModel,
    names: &[String],
    linear_model: bool,
) -> Result<Vec<FeatureImportance>> {
    let scores: Vec<f64> = match (linear_model, estimator.importance()) {
        (false, Some(Importance::Native(values))) => values,
        (true, Some(Importance::Coefficients(rows))) if !rows.is_empty() => {
            rows[0].iter().map(|c| c.abs()).collect()
        }
        (linear, _) => {
            return Err(EvalError::MissingImportance {
                model: estimator.name().to_string(),
                expected: if linear {
                    "linear coefficients"
                } else {
                    "native feature importances"
                },
            }
            .into())
        }
    };

    if scores.len() != names.len() {
        return Err(EvalError::FeatureNameCount {
            expected: names.len(),
            actual: scores.len(),
        }
        .into());
    }

    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(scores)
        .map(|(name, score)| FeatureImportance {
            feature: name.clone(),
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}
