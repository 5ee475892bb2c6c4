use modelfit::config::{EvaluationConfig, ModelConfig, ModelType, SearchScoring};
use modelfit::data_handling::FeatureTable;
use modelfit::math::Array2;
use modelfit::models::factory;
use modelfit::search::{ParamValue, ParameterGrid};

fn tiny() -> (FeatureTable, Vec<i32>) {
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // class 1
            0.0, 1.0, // class 0
            1.0, 0.1, // class 1
            0.0, 0.9, // class 0
            1.1, 0.0, // class 1
            0.0, 1.2, // class 0
        ],
    )
    .expect("failed to create feature matrix");
    let features = FeatureTable::new(vec!["f0".into(), "f1".into()], x).unwrap();
    (features, vec![1, 0, 1, 0, 1, 0])
}

#[test]
fn test_factory_builds_and_predicts() {
    let (x, y) = tiny();
    for model_type in [
        "bagged_trees".parse::<ModelType>().unwrap(),
        "logreg".parse::<ModelType>().unwrap(),
    ] {
        let mut model = factory::build_model(ModelConfig::new(42, model_type));
        model.fit(&x, &y).unwrap();
        let probs = model.predict_proba(&x).unwrap();
        assert_eq!(probs.len(), x.nrows());
        assert!(model.importance().is_some());
    }
}

#[test]
fn unknown_model_name_lists_options() {
    let err = "svm".parse::<ModelType>().unwrap_err();
    assert!(err.contains("bagged_trees"));
}

#[test]
fn model_config_json_round_trip() {
    let config = ModelConfig::new(
        7,
        ModelType::BaggedTrees {
            n_trees: 30,
            max_depth: Some(5),
            min_samples_leaf: 2,
            min_samples_split: 4,
            criterion: "entropy".to_string(),
        },
    );
    let json = serde_json::to_string(&config).unwrap();
    let back: ModelConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn evaluation_config_defaults_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eval.json");
    let body = format!(
        r#"{{"report_name": "run1", "output_dir": {}, "search_scoring": "roc_auc"}}"#,
        serde_json::to_string(dir.path()).unwrap()
    );
    std::fs::write(&path, body).unwrap();

    let config = EvaluationConfig::from_json_file(&path).unwrap();
    assert_eq!(config.report_name, "run1");
    assert_eq!(config.output_dir, dir.path());
    assert!(config.run_cross_validation);
    assert!(config.report_feature_importance);
    assert_eq!(config.cv_folds, 5);
    assert!(!config.linear_model);
    assert_eq!(config.search_scoring, SearchScoring::RocAuc);
    assert_eq!(config.n_jobs, None);
    assert_eq!(config.scores_path(), dir.path().join("run1_scores.csv"));
}

#[test]
fn evaluation_config_requires_output_dir() {
    let parsed: Result<EvaluationConfig, _> = serde_json::from_str(r#"{"report_name": "x"}"#);
    assert!(parsed.is_err());
}

#[test]
fn parameter_grid_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    std::fs::write(&path, r#"{"n_trees": [10, 20], "max_depth": [3, null]}"#).unwrap();

    let grid = ParameterGrid::from_json_file(&path).unwrap();
    let candidates = grid.candidates().unwrap();
    assert_eq!(candidates.len(), 4);
    assert_eq!(candidates[0]["max_depth"], ParamValue::Int(3));
    assert_eq!(candidates[0]["n_trees"], ParamValue::Int(10));
    assert_eq!(candidates[1]["n_trees"], ParamValue::Int(20));
}
