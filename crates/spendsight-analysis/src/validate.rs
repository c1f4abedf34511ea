//! Shape validation over script output bindings
//!
//! Script output is adversarial input. Each extraction function pulls one
//! binding into a plain Rust shape: a missing binding degrades to a neutral
//! default, while a binding of the wrong shape is rejected with the
//! offending key. Nothing a script binds ever reaches a report without
//! passing through here.

use spendsight_script::OutputBindings;
use std::collections::BTreeMap;

/// A binding that exists but does not have the shape the call site expects
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Binding '{key}' has the wrong shape: expected {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("Bindings '{left}' ({left_len}) and '{right}' ({right_len}) must have equal lengths")]
    LengthMismatch {
        left: String,
        right: String,
        left_len: usize,
        right_len: usize,
    },
}

impl ValidationError {
    fn wrong_type(key: &str, expected: &'static str) -> Self {
        Self::WrongType {
            key: key.to_string(),
            expected,
        }
    }
}

/// Missing binding → empty list. Present binding must be a list of numbers.
pub fn extract_number_list(
    bindings: &OutputBindings,
    key: &str,
) -> Result<Vec<f64>, ValidationError> {
    let Some(value) = bindings.get(key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_list()
        .ok_or_else(|| ValidationError::wrong_type(key, "a list of numbers"))?;
    items
        .iter()
        .map(|item| {
            item.as_number()
                .ok_or_else(|| ValidationError::wrong_type(key, "a list of numbers"))
        })
        .collect()
}

/// Missing binding → empty list. Present binding must be a list of booleans.
pub fn extract_bool_list(
    bindings: &OutputBindings,
    key: &str,
) -> Result<Vec<bool>, ValidationError> {
    let Some(value) = bindings.get(key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_list()
        .ok_or_else(|| ValidationError::wrong_type(key, "a list of booleans"))?;
    items
        .iter()
        .map(|item| {
            item.as_bool()
                .ok_or_else(|| ValidationError::wrong_type(key, "a list of booleans"))
        })
        .collect()
}

/// Missing binding → 0.0. Present binding must be a number.
pub fn extract_number(bindings: &OutputBindings, key: &str) -> Result<f64, ValidationError> {
    let Some(value) = bindings.get(key) else {
        return Ok(0.0);
    };
    value
        .as_number()
        .ok_or_else(|| ValidationError::wrong_type(key, "a number"))
}

/// Missing binding → empty map. Present binding must map strings to numbers.
pub fn extract_number_map(
    bindings: &OutputBindings,
    key: &str,
) -> Result<BTreeMap<String, f64>, ValidationError> {
    let Some(value) = bindings.get(key) else {
        return Ok(BTreeMap::new());
    };
    let entries = value
        .as_map()
        .ok_or_else(|| ValidationError::wrong_type(key, "a map of numbers"))?;
    entries
        .iter()
        .map(|(name, item)| {
            item.as_number()
                .map(|n| (name.clone(), n))
                .ok_or_else(|| ValidationError::wrong_type(key, "a map of numbers"))
        })
        .collect()
}

/// Two bindings that must line up element-for-element
pub fn ensure_aligned(
    left: &str,
    left_len: usize,
    right: &str,
    right_len: usize,
) -> Result<(), ValidationError> {
    if left_len != right_len {
        return Err(ValidationError::LengthMismatch {
            left: left.to_string(),
            right: right.to_string(),
            left_len,
            right_len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendsight_script::Value;

    fn bindings(pairs: &[(&str, Value)]) -> OutputBindings {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn missing_bindings_degrade_to_neutral_defaults() {
        let empty = OutputBindings::new();
        assert_eq!(extract_number_list(&empty, "scores").unwrap(), Vec::<f64>::new());
        assert_eq!(extract_bool_list(&empty, "flags").unwrap(), Vec::<bool>::new());
        assert_eq!(extract_number(&empty, "total").unwrap(), 0.0);
        assert!(extract_number_map(&empty, "per_service").unwrap().is_empty());
    }

    #[test]
    fn number_list_extraction() {
        let b = bindings(&[(
            "scores",
            Value::List(vec![Value::Number(1.0), Value::Number(2.5)]),
        )]);
        assert_eq!(extract_number_list(&b, "scores").unwrap(), vec![1.0, 2.5]);
    }

    #[test]
    fn non_list_binding_is_rejected_with_its_key() {
        let b = bindings(&[("scores", Value::Str("not-a-list".into()))]);
        let err = extract_number_list(&b, "scores").unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { ref key, .. } if key == "scores"));
    }

    #[test]
    fn list_with_a_non_numeric_element_is_rejected() {
        let b = bindings(&[(
            "scores",
            Value::List(vec![Value::Number(1.0), Value::Bool(true)]),
        )]);
        assert!(extract_number_list(&b, "scores").is_err());
    }

    #[test]
    fn number_map_extraction() {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("A".to_string(), Value::Number(120.0));
        entries.insert("B".to_string(), Value::Number(50.0));
        let b = bindings(&[("per_service", Value::Map(entries))]);

        let map = extract_number_map(&b, "per_service").unwrap();
        assert_eq!(map.get("A"), Some(&120.0));
        assert_eq!(map.get("B"), Some(&50.0));
    }

    #[test]
    fn map_with_non_numeric_values_is_rejected() {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("A".to_string(), Value::Str("lots".into()));
        let b = bindings(&[("per_service", Value::Map(entries))]);
        assert!(extract_number_map(&b, "per_service").is_err());
    }

    #[test]
    fn alignment_check() {
        assert!(ensure_aligned("scores", 3, "flags", 3).is_ok());
        let err = ensure_aligned("scores", 3, "flags", 2).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::LengthMismatch {
                left_len: 3,
                right_len: 2,
                ..
            }
        ));
    }
}
