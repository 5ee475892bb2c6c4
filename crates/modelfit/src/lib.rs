//! modelfit: fit, tune and report on binary classifiers.
//!
//! The entry point is [`evaluator::evaluate`]. It fits a classifier (or the
//! best candidate of a grid search), reports training and cross-validated
//! ROC AUC, ranks feature importances, and writes a small set of CSV and
//! HTML report files next to a console summary.
//!
//! Models are plugged in through [`models::classifier_trait::ClassifierModel`];
//! bagged decision trees and a logistic regression built on smartcore ship with the
//! crate and are constructed by [`models::factory::build_model`].
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluator;
pub mod math;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod search;
pub mod stats;

pub use error::EvalError;
pub use evaluator::{evaluate, EvaluationSummary};
