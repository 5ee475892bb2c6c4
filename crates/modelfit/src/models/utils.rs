//! Hyper-parameter coercion shared by the model wrappers.
use smartcore::tree::decision_tree_classifier::SplitCriterion;

use crate::error::EvalError;
use crate::search::ParamValue;

fn invalid(name: &str, value: &ParamValue) -> EvalError {
    EvalError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

pub fn as_f64(name: &str, value: &ParamValue) -> Result<f64, EvalError> {
    match value {
        ParamValue::Float(v) if v.is_finite() => Ok(*v),
        ParamValue::Int(v) => Ok(*v as f64),
        _ => Err(invalid(name, value)),
    }
}

pub fn as_usize(name: &str, value: &ParamValue) -> Result<usize, EvalError> {
    match value {
        ParamValue::Int(v) if *v >= 0 => Ok(*v as usize),
        _ => Err(invalid(name, value)),
    }
}

pub fn as_u16(name: &str, value: &ParamValue) -> Result<u16, EvalError> {
    match value {
        ParamValue::Int(v) => u16::try_from(*v).map_err(|_| invalid(name, value)),
        _ => Err(invalid(name, value)),
    }
}

pub fn as_u64(name: &str, value: &ParamValue) -> Result<u64, EvalError> {
    match value {
        ParamValue::Int(v) => u64::try_from(*v).map_err(|_| invalid(name, value)),
        _ => Err(invalid(name, value)),
    }
}

/// `Null` means "no limit".
pub fn as_optional_u16(name: &str, value: &ParamValue) -> Result<Option<u16>, EvalError> {
    match value {
        ParamValue::Null => Ok(None),
        other => as_u16(name, other).map(Some),
    }
}

pub fn as_text(name: &str, value: &ParamValue) -> Result<String, EvalError> {
    match value {
        ParamValue::Text(s) => Ok(s.clone()),
        _ => Err(invalid(name, value)),
    }
}

pub fn parse_criterion(criterion: &str) -> Result<SplitCriterion, EvalError> {
    match criterion.to_lowercase().as_str() {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        "classification_error" => Ok(SplitCriterion::ClassificationError),
        _ => Err(EvalError::InvalidParameter {
            name: "criterion".to_string(),
            value: criterion.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_coerce_to_float_but_not_back() {
        assert_eq!(as_f64("alpha", &ParamValue::Int(2)).unwrap(), 2.0);
        assert!(as_usize("n", &ParamValue::Float(2.0)).is_err());
        assert!(as_usize("n", &ParamValue::Int(-1)).is_err());
    }

    #[test]
    fn null_depth_means_unlimited() {
        assert_eq!(as_optional_u16("max_depth", &ParamValue::Null).unwrap(), None);
        assert_eq!(as_optional_u16("max_depth", &ParamValue::Int(4)).unwrap(), Some(4));
        assert!(as_optional_u16("max_depth", &ParamValue::Int(70_000)).is_err());
    }

    #[test]
    fn unknown_criterion_is_rejected() {
        assert!(parse_criterion("Gini").is_ok());
        assert!(parse_criterion("mse").is_err());
    }
}
