//! Feature table, label checks and cross-validation fold assignment.
//!
//! `FeatureTable` pairs a row-major matrix with its column names. Labels are
//! plain `i32` slices; binary problems treat the larger of the two label
//! values as the positive class.
use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::error::EvalError;
use crate::math::Array2;

/// Ordered, named numeric feature columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    x: Array2<f64>,
}

impl FeatureTable {
    pub fn new(names: Vec<String>, x: Array2<f64>) -> Result<Self> {
        if names.len() != x.ncols() {
            return Err(EvalError::FeatureNameCount {
                expected: x.ncols(),
                actual: names.len(),
            }
            .into());
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(EvalError::DuplicateFeature(name.clone()).into());
            }
        }
        Ok(Self { names, x })
    }

    /// Build a table from named columns of equal length.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let nrows = columns.first().map_or(0, |(_, values)| values.len());
        let ncols = columns.len();
        let mut names = Vec::with_capacity(ncols);
        let mut data = vec![0.0; nrows * ncols];
        for (c, (name, values)) in columns.into_iter().enumerate() {
            if values.len() != nrows {
                return Err(EvalError::InvalidShape {
                    rows: nrows,
                    cols: ncols,
                    len: values.len(),
                }
                .into());
            }
            for (r, v) in values.into_iter().enumerate() {
                data[r * ncols + c] = v;
            }
            names.push(name.into());
        }
        let x = Array2::from_shape_vec((nrows, ncols), data)?;
        Self::new(names, x)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        self.x.column(col)
    }

    /// Row subset keeping column names.
    pub fn select_rows(&self, indices: &[usize]) -> FeatureTable {
        FeatureTable {
            names: self.names.clone(),
            x: self.x.select_rows(indices),
        }
    }

    /// Replace the values while keeping names. Shape must be unchanged.
    pub fn with_matrix(&self, x: Array2<f64>) -> Result<FeatureTable> {
        if x.shape() != self.x.shape() {
            return Err(EvalError::InvalidShape {
                rows: self.x.nrows(),
                cols: self.x.ncols(),
                len: x.as_slice().len(),
            }
            .into());
        }
        Ok(FeatureTable {
            names: self.names.clone(),
            x,
        })
    }
}

/// Fail unless there is exactly one label per feature row.
pub fn check_row_counts(features: &FeatureTable, labels: &[i32]) -> Result<(), EvalError> {
    if features.nrows() != labels.len() {
        return Err(EvalError::ShapeMismatch {
            features: features.nrows(),
            labels: labels.len(),
        });
    }
    Ok(())
}

/// Sorted distinct label values.
pub fn classes(labels: &[i32]) -> Vec<i32> {
    let mut classes = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// The positive class of a binary label vector (the larger label).
pub fn positive_class(labels: &[i32]) -> Result<i32, EvalError> {
    let classes = classes(labels);
    match classes.as_slice() {
        [_, pos] => Ok(*pos),
        [_] => Err(EvalError::UndefinedAuc {
            context: format!("all {} labels are {}", labels.len(), classes[0]),
        }),
        other => Err(EvalError::NotBinary(other.len())),
    }
}

/// One cross-validation split, as row indices into the full data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified k-fold split without shuffling.
///
/// Classes are numbered in order of first appearance. Lay the class numbers
/// out sorted and deal them round-robin into `n_folds` piles: pile `f` holds
/// how many rows of each class test in fold `f`. Rows of a class then fill
/// folds `0..n_folds` in their original order. Leftover rows of different
/// classes land in different folds, which keeps fold sizes within one row.
pub fn stratified_folds(labels: &[i32], n_folds: usize) -> Result<Vec<Fold>, EvalError> {
    let n_samples = labels.len();
    if n_folds < 2 || n_folds > n_samples {
        return Err(EvalError::InvalidFolds {
            folds: n_folds,
            rows: n_samples,
        });
    }

    let mut codes: HashMap<i32, usize> = HashMap::new();
    let mut members: Vec<(i32, Vec<usize>)> = Vec::new();
    for (i, &label) in labels.iter().enumerate() {
        let code = *codes.entry(label).or_insert_with(|| {
            members.push((label, Vec::new()));
            members.len() - 1
        });
        members[code].1.push(i);
    }

    // allocation[fold][class]
    let mut allocation = vec![vec![0usize; members.len()]; n_folds];
    let mut position = 0;
    for (code, (_, rows)) in members.iter().enumerate() {
        for _ in 0..rows.len() {
            allocation[position % n_folds][code] += 1;
            position += 1;
        }
    }

    let mut test_sets: Vec<Vec<usize>> = vec![Vec::new(); n_folds];
    for (code, (class, rows)) in members.iter().enumerate() {
        if rows.len() < n_folds {
            log::warn!(
                "Class {} has only {} members, fewer than the {} folds requested",
                class,
                rows.len(),
                n_folds
            );
        }
        let mut start = 0;
        for (fold, test) in test_sets.iter_mut().enumerate() {
            let size = allocation[fold][code];
            test.extend_from_slice(&rows[start..start + size]);
            start += size;
        }
    }

    let folds = test_sets
        .into_iter()
        .enumerate()
        .map(|(i, mut test)| {
            test.sort_unstable();
            let mut in_test = vec![false; n_samples];
            for &idx in &test {
                in_test[idx] = true;
            }
            let train: Vec<usize> = (0..n_samples).filter(|&idx| !in_test[idx]).collect();
            log::trace!(
                "Fold {} has {} training rows and {} test rows",
                i,
                train.len(),
                test.len()
            );
            Fold { train, test }
        })
        .collect();

    Ok(folds)
}

/// Labels at the given row indices.
pub fn select_labels(labels: &[i32], indices: &[usize]) -> Vec<i32> {
    indices.iter().map(|&i| labels[i]).collect()
}
