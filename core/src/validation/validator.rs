use super::{ConstraintValidator, Violation, ViolationList};
use crate::errors::{error_codes, BindingError};
use crate::metadata::{FieldKind, TypeDescriptor, TypeIntrospector, TypeRegistry};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Validates instances against the constraints declared on their type
/// descriptors.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    types: Arc<TypeRegistry>,
}

impl RuleValidator {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    fn descriptor(&self, type_name: &str) -> Result<&TypeDescriptor, BindingError> {
        self.types.describe(type_name).ok_or_else(|| {
            BindingError::configuration(
                error_codes::UNKNOWN_TYPE,
                format!("Type '{}' is not registered", type_name),
            )
        })
    }

    fn validate_object(
        &self,
        descriptor: &TypeDescriptor,
        instance: &JsonValue,
        prefix: &str,
        groups: &[String],
        violations: &mut ViolationList,
    ) -> Result<(), BindingError> {
        for (name, field) in &descriptor.fields {
            let path = join_path(prefix, name);
            let value = instance.get(name).unwrap_or(&JsonValue::Null);

            for constraint in field.constraints.iter().filter(|c| c.applies_to(groups)) {
                if let Some(failure) = constraint.check(value) {
                    violations.push(Violation::from_failure(path.clone(), failure));
                }
            }

            self.cascade(&field.kind, value, &path, groups, violations)?;
        }
        Ok(())
    }

    fn cascade(
        &self,
        kind: &FieldKind,
        value: &JsonValue,
        path: &str,
        groups: &[String],
        violations: &mut ViolationList,
    ) -> Result<(), BindingError> {
        match (kind, value) {
            (FieldKind::Object(type_name), JsonValue::Object(_)) => {
                let nested = self.descriptor(type_name)?;
                self.validate_object(nested, value, path, groups, violations)
            }
            (FieldKind::List(inner), JsonValue::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    self.cascade(inner, item, &item_path, groups, violations)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl ConstraintValidator for RuleValidator {
    fn validate(
        &self,
        type_name: &str,
        instance: &JsonValue,
        groups: &[String],
    ) -> Result<ViolationList, BindingError> {
        let descriptor = self.descriptor(type_name)?;
        let mut violations = ViolationList::new();
        if instance.is_object() {
            self.validate_object(descriptor, instance, "", groups, &mut violations)?;
        }
        Ok(violations)
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
