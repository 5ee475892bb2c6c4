pub mod classifier_trait;
pub mod factory;
pub mod logistic;
pub mod bagged_trees;
pub mod utils;
