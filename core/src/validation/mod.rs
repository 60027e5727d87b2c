//! # FORZIUM BINDING VALIDATION MODULE
//!
//! **CONSTRAINT VALIDATION AND ERROR AGGREGATION**
//!
//! This module provides the `ConstraintValidator` contract, the rule-based
//! implementation used by default, and the `ErrorTree` every violation is
//! folded into before it reaches the controller boundary.
//!
//! ## VALIDATION PIPELINE
//!
//! 1. **FIELD RULES** - Constraints declared on each field, filtered by group
//! 2. **CASCADE** - Nested objects and lists of objects are walked recursively
//! 3. **AGGREGATION** - Violations are inserted into an `ErrorTree` by property path
//!
//! ## USAGE
//!
//! ```rust,ignore
//! use forzium_binding::validation::{build_error_tree, ConstraintValidator, RuleValidator};
//!
//! let violations = validator.validate("Signup", &instance, &groups)?;
//! let tree = build_error_tree(&violations);
//! ```

use crate::errors::BindingError;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub mod constraints;
pub mod error_tree;
pub mod validator;

pub use constraints::{Constraint, Rule, RuleFailure, DEFAULT_GROUP};
pub use error_tree::{parse_property_path, ErrorTree, Segment};
pub use validator::RuleValidator;

/// **VIOLATION RECORD**
///
/// One failed rule at one property path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// **PROPERTY PATH** - Dotted, optionally indexed (`lines[2].sku`)
    pub property_path: String,

    /// **RENDERED MESSAGE**
    pub message: String,

    /// **MESSAGE TEMPLATE** - Message before parameter substitution
    pub template: String,

    /// **TEMPLATE PARAMETERS**
    pub parameters: BTreeMap<String, String>,
}

impl Violation {
    pub fn new(property_path: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            property_path: property_path.into(),
            template: message.clone(),
            message,
            parameters: BTreeMap::new(),
        }
    }

    pub fn from_failure(property_path: impl Into<String>, failure: RuleFailure) -> Self {
        Self {
            property_path: property_path.into(),
            message: failure.message,
            template: failure.template,
            parameters: failure.parameters,
        }
    }
}

pub type ViolationList = Vec<Violation>;

/// **CONSTRAINT VALIDATOR CONTRACT**
///
/// **MANDATE**: Implementations MUST report every violated constraint, never
/// only the first.
pub trait ConstraintValidator: Send + Sync {
    /// **VALIDATION EXECUTION**
    ///
    /// **PARAMETERS**:
    /// - `type_name` - Registered type `instance` is an instance of
    /// - `instance` - Denormalized object
    /// - `groups` - Validation groups; a constraint runs when it belongs to any
    ///
    /// **RETURNS**:
    /// - `Ok(ViolationList)` - Empty when the instance is valid
    /// - `Err(BindingError::Configuration)` - A referenced type is not registered
    fn validate(
        &self,
        type_name: &str,
        instance: &JsonValue,
        groups: &[String],
    ) -> Result<ViolationList, BindingError>;
}

/// Folds violations into an error tree in order.
pub fn build_error_tree(violations: &[Violation]) -> ErrorTree {
    let mut tree = ErrorTree::new();
    for violation in violations {
        tree.insert(&violation.property_path, violation.message.as_str());
    }
    tree
}
