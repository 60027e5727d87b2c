//! # FORZIUM BINDING TYPE DEFINITIONS
//!
//! **CRITICAL**: Values exchanged between the binding layer and the
//! controller-invocation boundary.

use crate::errors::{error_codes, BindingError};
use crate::validation::ErrorTree;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// **RAW PAYLOAD**
///
/// Ordered field-name to value mapping extracted from a request. Never
/// mutated after extraction.
pub type RawPayload = Map<String, Value>;

/// **BOUND INSTANCE**
///
/// **PURPOSE**: A denormalized, validated object of a registered type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundInstance {
    /// **TYPE NAME** - Registered type the data conforms to
    pub type_name: String,

    /// **FIELD DATA**
    pub data: Value,
}

impl BoundInstance {
    pub fn new(type_name: impl Into<String>, data: Value) -> Self {
        Self {
            type_name: type_name.into(),
            data,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// **TYPED ACCESS** - Converts the bound data into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            BindingError::configuration(
                error_codes::UNKNOWN_TYPE,
                format!("Bound '{}' does not fit the requested type: {}", self.type_name, e),
            )
        })
    }
}

/// **BINDING OUTCOME**
#[derive(Debug, Clone, PartialEq)]
pub enum BindingOutcome {
    /// The argument is not handled by this resolver.
    Skipped,
    Bound(BoundInstance),
    Rejected(ErrorTree),
}

impl BindingOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, BindingOutcome::Skipped)
    }

    /// Zero or one bound value, or the terminal validation failure.
    pub fn into_result(self) -> Result<Option<BoundInstance>, BindingError> {
        match self {
            BindingOutcome::Skipped => Ok(None),
            BindingOutcome::Bound(instance) => Ok(Some(instance)),
            BindingOutcome::Rejected(errors) => Err(BindingError::Validation { errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Signup {
        email: String,
        age: Option<u8>,
    }

    #[test]
    fn test_typed_access() {
        let instance = BoundInstance::new("Signup", json!({"email": "a@b.io", "age": null}));
        let signup: Signup = instance.deserialize().unwrap();
        assert_eq!(
            signup,
            Signup {
                email: "a@b.io".to_string(),
                age: None
            }
        );
        assert_eq!(instance.get("email"), Some(&json!("a@b.io")));
    }

    #[test]
    fn test_typed_access_mismatch() {
        let instance = BoundInstance::new("Signup", json!({"email": 3}));
        assert!(matches!(
            instance.deserialize::<Signup>(),
            Err(BindingError::Configuration { .. })
        ));
    }

    #[test]
    fn test_outcome_into_result() {
        assert!(BindingOutcome::Skipped.into_result().unwrap().is_none());

        let bound = BindingOutcome::Bound(BoundInstance::new("T", json!({})));
        assert!(bound.into_result().unwrap().is_some());

        let mut tree = ErrorTree::new();
        tree.insert("name", "blank");
        let error = BindingOutcome::Rejected(tree).into_result().unwrap_err();
        assert_eq!(error.status_code(), 422);
        assert_eq!(error.errors().unwrap().messages("name"), ["blank"]);
    }
}
