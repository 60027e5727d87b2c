//! Turns coercion failures into violations the error tree understands.

use super::{NotNormalizableValue, PartialDenormalization};
use crate::validation::{Violation, ViolationList};
use std::collections::BTreeMap;

pub const UNEXPECTED_TYPE_MESSAGE: &str = "This value was of an unexpected type.";
pub const EXPECTED_TYPE_TEMPLATE: &str = "This value should be of type {{ type }}.";

/// Message selection: a user-safe message verbatim, else one naming the
/// expected types, else a generic one.
pub fn violation_from_error(error: &NotNormalizableValue) -> Violation {
    let mut parameters = BTreeMap::new();
    let mut template = UNEXPECTED_TYPE_MESSAGE.to_string();
    if !error.expected_types.is_empty() {
        template = EXPECTED_TYPE_TEMPLATE.to_string();
        parameters.insert("{{ type }}".to_string(), error.expected_types.join("|"));
    }
    if error.user_safe {
        parameters.insert("hint".to_string(), error.message.clone());
    }

    let message = if error.user_safe {
        error.message.clone()
    } else if !error.expected_types.is_empty() {
        format!(
            "The type must be one of \"{}\" (\"{}\" given).",
            error.expected_types.join(", "),
            error.current_type
        )
    } else {
        UNEXPECTED_TYPE_MESSAGE.to_string()
    };

    Violation {
        property_path: error.path.clone(),
        message,
        template,
        parameters,
    }
}

pub fn violations_from_partial(partial: &PartialDenormalization) -> ViolationList {
    partial.errors.iter().map(violation_from_error).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(expected: &[&str], user_safe: bool) -> NotNormalizableValue {
        NotNormalizableValue {
            path: "age".to_string(),
            expected_types: expected.iter().map(|t| t.to_string()).collect(),
            current_type: "string".to_string(),
            message: "Age must be a whole number.".to_string(),
            user_safe,
        }
    }

    #[test]
    fn test_expected_type_message() {
        let violation = violation_from_error(&error(&["integer"], false));
        assert_eq!(violation.property_path, "age");
        assert_eq!(
            violation.message,
            "The type must be one of \"integer\" (\"string\" given)."
        );
        assert_eq!(violation.template, EXPECTED_TYPE_TEMPLATE);
        assert_eq!(violation.parameters["{{ type }}"], "integer");
        assert!(!violation.parameters.contains_key("hint"));
    }

    #[test]
    fn test_user_safe_message_wins() {
        let violation = violation_from_error(&error(&["integer"], true));
        assert_eq!(violation.message, "Age must be a whole number.");
        assert_eq!(violation.parameters["hint"], "Age must be a whole number.");
    }

    #[test]
    fn test_generic_message() {
        let violation = violation_from_error(&error(&[], false));
        assert_eq!(violation.message, UNEXPECTED_TYPE_MESSAGE);
        assert_eq!(violation.template, UNEXPECTED_TYPE_MESSAGE);
        assert!(violation.parameters.is_empty());
    }

    #[test]
    fn test_multiple_expected_types() {
        let violation = violation_from_error(&error(&["integer", "float"], false));
        assert_eq!(
            violation.message,
            "The type must be one of \"integer, float\" (\"string\" given)."
        );
        assert_eq!(violation.parameters["{{ type }}"], "integer|float");
    }

    #[test]
    fn test_partial_keeps_order() {
        let partial = PartialDenormalization {
            data: None,
            errors: vec![error(&["integer"], false), error(&[], false)],
        };
        assert_eq!(violations_from_partial(&partial).len(), 2);
    }
}
