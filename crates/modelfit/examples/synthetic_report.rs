use std::path::PathBuf;

use anyhow::Result;
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use modelfit::config::{EvaluationConfig, ModelConfig, ModelType};
use modelfit::data_handling::FeatureTable;
use modelfit::models::factory;
use modelfit::search::{ParamValue, ParameterGrid};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MODELFIT_LOG", "error,modelfit=info"))
        .init();

    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    // 200 rows: `signal` shifts with the label, `noise` does not
    let mut rng = StdRng::seed_from_u64(7);
    let labels: Vec<i32> = (0..200).map(|i| (i % 2) as i32).collect();
    let signal: Vec<f64> = labels
        .iter()
        .map(|&y| y as f64 * 1.5 + rng.gen::<f64>())
        .collect();
    let noise: Vec<f64> = (0..200).map(|_| rng.gen::<f64>()).collect();
    let features = FeatureTable::from_columns(vec![("signal", signal), ("noise", noise)])?;

    println!("Synthetic X shape: {:?}", features.matrix().shape());

    let model = factory::build_model(ModelConfig::new(
        42,
        ModelType::BaggedTrees {
            n_trees: 25,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            criterion: "gini".to_string(),
        },
    ));
    let grid = ParameterGrid::new().with("max_depth", vec![ParamValue::Int(2), ParamValue::Int(4)]);

    let config = EvaluationConfig::new("synthetic_rf", &output_dir);
    let summary = modelfit::evaluate(model.as_ref(), &features, &labels, Some(&grid), &config)?;

    println!("Best parameters: {:?}", summary.best_params);
    for path in &summary.written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
