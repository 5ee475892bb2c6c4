use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::EvalError;

/// Area under the ROC curve for `scores` against binary `labels`.
///
/// Uses the rank-sum (Mann-Whitney U) form: tied scores share the average
/// of their ranks, which gives the same value as trapezoidal integration of
/// the ROC curve.
///
/// # Arguments
///
/// * `labels` - True class of each row.
/// * `scores` - Higher means more likely to be `positive`.
/// * `positive` - Label value of the positive class.
///
/// # Errors
///
/// [`EvalError::UndefinedAuc`] when either class is absent, and
/// [`EvalError::ShapeMismatch`] when the slices differ in length.
pub fn roc_auc(labels: &[i32], scores: &[f64], positive: i32) -> Result<f64, EvalError> {
    if labels.len() != scores.len() {
        return Err(EvalError::ShapeMismatch {
            features: scores.len(),
            labels: labels.len(),
        });
    }

    let n_pos = labels.iter().filter(|&&l| l == positive).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(EvalError::UndefinedAuc {
            context: format!("{} positives and {} negatives", n_pos, n_neg),
        });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average 1-based ranks over runs of equal scores.
    let mut rank_sum_pos = 0.0f64;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        let pos_in_run = order[start..end]
            .iter()
            .filter(|&&i| labels[i] == positive)
            .count();
        rank_sum_pos += avg_rank * pos_in_run as f64;
        start = end;
    }

    let n_pos_f = n_pos as f64;
    let u = rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0;
    Ok(u / (n_pos_f * n_neg as f64))
}

/// Fraction of predictions equal to the true label.
pub fn accuracy(labels: &[i32], predictions: &[i32]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / labels.len() as f64
}

/// Summary of per-fold cross-validation scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CvSummary {
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl CvSummary {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        Some(Self {
            mean: scores.iter().mean(),
            std: scores.iter().population_std_dev(),
            min: Statistics::min(scores.iter()),
            max: Statistics::max(scores.iter()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_ranking_is_one() {
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9], 1).unwrap();
        assert!((auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_ranking_is_zero() {
        let auc = roc_auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9], 1).unwrap();
        assert!(auc.abs() < 1e-12);
    }

    #[test]
    fn known_value_with_ties() {
        // Positive 0.35 beats one of two negatives, 0.8 beats both
        let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8], 1).unwrap();
        assert!((auc - 0.75).abs() < 1e-12);
        // Positive and negative tie at 0.3 and split the pair
        let tied = roc_auc(&[0, 1, 0, 1], &[0.3, 0.3, 0.1, 0.9], 1).unwrap();
        assert!((tied - 0.875).abs() < 1e-12);
    }

    #[test]
    fn all_equal_scores_is_half() {
        let auc = roc_auc(&[0, 1, 0, 1], &[0.5; 4], 1).unwrap();
        assert!((auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn single_class_is_undefined() {
        let err = roc_auc(&[1, 1, 1], &[0.2, 0.4, 0.9], 1).unwrap_err();
        assert!(matches!(err, EvalError::UndefinedAuc { .. }));
    }

    #[test]
    fn cv_summary_uses_population_std() {
        let summary = CvSummary::from_scores(&[0.6, 0.8]).unwrap();
        assert!((summary.mean - 0.7).abs() < 1e-12);
        assert!((summary.std - 0.1).abs() < 1e-12);
        assert_eq!(summary.min, 0.6);
        assert_eq!(summary.max, 0.8);
        assert!(CvSummary::from_scores(&[]).is_none());
    }
}
