//! Feature rescaling applied before fitting linear models.
//!
//! Linear coefficients are only comparable as importances when every column
//! is on the same scale, so each column is divided by its population
//! standard deviation. Columns are not centred.

use anyhow::Result;

use crate::data_handling::FeatureTable;
use crate::error::EvalError;
use crate::math::Array2;

/// Population standard deviation (ddof = 0) of every column.
pub fn column_std(x: &Array2<f64>) -> Vec<f64> {
    let (nrows, ncols) = x.shape();
    if nrows == 0 {
        return vec![0.0; ncols];
    }

    let nrows_f = nrows as f64;
    let mut mean = vec![0.0f64; ncols];
    for r in 0..nrows {
        for (c, m) in mean.iter_mut().enumerate() {
            *m += x[(r, c)];
        }
    }
    for m in mean.iter_mut() {
        *m /= nrows_f;
    }

    let mut var = vec![0.0f64; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            let d = x[(r, c)] - mean[c];
            var[c] += d * d;
        }
    }
    var.into_iter().map(|v| (v / nrows_f).sqrt()).collect()
}

/// Divide every column by its population standard deviation.
///
/// A column holding NaN or infinity fails with [`EvalError::NonFinite`]; a
/// column with zero spread fails with [`EvalError::ZeroVariance`]. Both
/// name the column.
pub fn scale_by_std(features: &FeatureTable) -> Result<FeatureTable> {
    let std = column_std(features.matrix());
    // A constant column can leave rounding residue in the mean, so check
    // the values themselves as well as the computed spread.
    for (col, &s) in std.iter().enumerate() {
        let name = &features.names()[col];
        let values = features.column(col);
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EvalError::NonFinite(name.clone()).into());
        }
        let constant = values.windows(2).all(|w| w[0] == w[1]);
        if constant || s == 0.0 || !s.is_finite() {
            return Err(EvalError::ZeroVariance(name.clone()).into());
        }
    }
    log::debug!("Rescaling {} columns by std {:?}", std.len(), std);
    let scaled = features.matrix().map_columns(|c, v| v / std[c]);
    features.with_matrix(scaled)
}
