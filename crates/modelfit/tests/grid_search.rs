use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use modelfit::config::{EvaluationConfig, ModelConfig, ModelType, SearchScoring};
use modelfit::data_handling::{stratified_folds, FeatureTable};
use modelfit::models::classifier_trait::ClassifierModel;
use modelfit::models::factory;
use modelfit::search::{GridSearch, HyperparameterSearch, ParamValue, ParameterGrid};
use modelfit::{evaluate, EvalError};

fn overlapping_classes() -> (FeatureTable, Vec<i32>) {
    let mut rng = StdRng::seed_from_u64(3);
    let labels: Vec<i32> = (0..90).map(|i| (i % 2) as i32).collect();
    let a: Vec<f64> = labels
        .iter()
        .map(|&y| y as f64 * 0.6 + rng.gen::<f64>())
        .collect();
    let b: Vec<f64> = (0..90).map(|_| rng.gen::<f64>()).collect();
    let features = FeatureTable::from_columns(vec![("a", a), ("b", b)]).unwrap();
    (features, labels)
}

fn logistic() -> Box<dyn ClassifierModel> {
    factory::build_model(ModelConfig::new(
        42,
        ModelType::LogisticRegression { alpha: 1.0 },
    ))
}

fn bagged_trees() -> Box<dyn ClassifierModel> {
    factory::build_model(ModelConfig::new(
        5,
        ModelType::BaggedTrees {
            n_trees: 10,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            criterion: "gini".to_string(),
        },
    ))
}

#[test]
fn ties_keep_the_first_candidate() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (x, y) = overlapping_classes();
    let folds = stratified_folds(&y, 3).unwrap();
    // Logistic regression ignores the seed, so every candidate scores the same
    let grid = ParameterGrid::new().with("seed", vec![9i64, 1, 5]);

    let outcome = GridSearch::new(grid)
        .search(logistic().as_ref(), &x, &y, &folds)
        .unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert!(outcome
        .results
        .windows(2)
        .all(|w| w[0].mean_score == w[1].mean_score));
    assert_eq!(outcome.best_params["seed"], ParamValue::Int(9));
}

#[test]
fn every_candidate_is_scored_in_grid_order() {
    let (x, y) = overlapping_classes();
    let folds = stratified_folds(&y, 3).unwrap();
    let grid = ParameterGrid::new()
        .with("max_depth", vec![ParamValue::Int(1), ParamValue::Null])
        .with("min_samples_leaf", vec![1i64, 5]);

    let outcome = GridSearch::new(grid)
        .with_scoring(SearchScoring::RocAuc)
        .search(bagged_trees().as_ref(), &x, &y, &folds)
        .unwrap();

    let depths: Vec<&ParamValue> = outcome.results.iter().map(|r| &r.params["max_depth"]).collect();
    assert_eq!(
        depths,
        vec![
            &ParamValue::Int(1),
            &ParamValue::Int(1),
            &ParamValue::Null,
            &ParamValue::Null
        ]
    );
    for r in &outcome.results {
        assert_eq!(r.fold_scores.len(), 3);
        assert!(r.mean_score <= outcome.best_score);
    }
    assert!(outcome.best_estimator.predict_proba(&x).is_ok());
}

#[test]
fn dedicated_pool_gives_the_same_result() {
    let (x, y) = overlapping_classes();
    let folds = stratified_folds(&y, 3).unwrap();
    let grid = ParameterGrid::new().with("alpha", vec![0.01, 1.0, 100.0]);

    let shared = GridSearch::new(grid.clone())
        .search(logistic().as_ref(), &x, &y, &folds)
        .unwrap();
    let pooled = GridSearch::new(grid)
        .with_n_jobs(Some(2))
        .search(logistic().as_ref(), &x, &y, &folds)
        .unwrap();

    assert_eq!(shared.results, pooled.results);
    assert_eq!(shared.best_params, pooled.best_params);
}

#[test]
fn unknown_parameter_fails_the_search() {
    let (x, y) = overlapping_classes();
    let folds = stratified_folds(&y, 3).unwrap();
    let grid = ParameterGrid::new().with("n_trees", vec![10i64]);

    let err = GridSearch::new(grid)
        .search(logistic().as_ref(), &x, &y, &folds)
        .err()
        .unwrap();
    assert!(matches!(
        err.downcast_ref::<EvalError>(),
        Some(EvalError::UnknownParameter { .. })
    ));
}

#[test]
fn evaluate_adopts_the_best_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let (x, y) = overlapping_classes();
    let mut config = EvaluationConfig::new("tuned", dir.path());
    config.cv_folds = 3;
    config.search_scoring = SearchScoring::RocAuc;
    let grid = ParameterGrid::new().with("max_depth", vec![ParamValue::Int(2), ParamValue::Int(6)]);

    let summary = evaluate(bagged_trees().as_ref(), &x, &y, Some(&grid), &config).unwrap();

    let best = summary.best_params.unwrap();
    assert!(best.contains_key("max_depth"));
    assert!(summary.best_search_score.is_some());
    assert_eq!(summary.cv_scores.len(), 3);
    assert_eq!(summary.written.len(), 3);
}
