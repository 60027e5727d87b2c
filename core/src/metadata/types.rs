//! # BINDING METADATA
//!
//! **PURPOSE**: Explicit, reflection-free description of controller arguments
//! and the types they bind to.
//! **MANDATE**: Descriptors are registered once at startup and only read
//! afterwards.

use crate::validation::Constraint;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// **REQUEST DIRECTIVE**
///
/// Opt-in marker attached to a parameter or a type. When `form` is set the
/// argument is bound through that form definition instead of being
/// denormalized directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDirective {
    #[serde(default)]
    pub form: Option<String>,
}

impl RequestDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(form_id: impl Into<String>) -> Self {
        Self {
            form: Some(form_id.into()),
        }
    }
}

/// **CONTROLLER ARGUMENT METADATA**
///
/// What the framework knows about one controller parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentMetadata {
    pub name: String,
    pub type_name: Option<String>,
    pub directives: Vec<RequestDirective>,
}

impl ArgumentMetadata {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            directives: Vec::new(),
        }
    }

    /// Argument without a declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            directives: Vec::new(),
        }
    }

    pub fn with_directive(mut self, directive: RequestDirective) -> Self {
        self.directives.push(directive);
        self
    }
}

/// **FIELD KIND**
///
/// Selects the converter used for a field during denormalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    /// String restricted to a fixed set of values.
    Enum(Vec<String>),
    List(Box<FieldKind>),
    /// Nested object described by another registered type.
    Object(String),
    Any,
}

impl FieldKind {
    pub fn list_of(kind: FieldKind) -> Self {
        FieldKind::List(Box::new(kind))
    }

    pub fn object(type_name: impl Into<String>) -> Self {
        FieldKind::Object(type_name.into())
    }

    /// Name reported as the expected type when a value does not fit.
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::String | FieldKind::Enum(_) => "string".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Float => "float".to_string(),
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::List(_) => "array".to_string(),
            FieldKind::Object(name) => name.clone(),
            FieldKind::Any => "mixed".to_string(),
        }
    }
}

/// One declared field of a bindable type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub constraints: Vec<Constraint>,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            default: None,
            constraints: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// **TYPE DESCRIPTOR**
///
/// Stands in for a class: its fields in declaration order, whether it
/// implements the binding marker, and any class-level directive.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: IndexMap<String, FieldDescriptor>,
    pub binding_marker: bool,
    pub directive: Option<RequestDirective>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            binding_marker: false,
            directive: None,
        }
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Declares the binding marker capability.
    pub fn marker(mut self) -> Self {
        self.binding_marker = true;
        self
    }

    pub fn directive(mut self, directive: RequestDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Initial data of a fresh instance: declared defaults, `null` elsewhere.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    field.default.clone().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_follow_declaration_order() {
        let descriptor = TypeDescriptor::new("Profile")
            .field("name", FieldDescriptor::new(FieldKind::String))
            .field(
                "active",
                FieldDescriptor::new(FieldKind::Boolean).with_default(json!(true)),
            );

        let defaults = descriptor.defaults();
        assert_eq!(defaults.keys().collect::<Vec<_>>(), vec!["name", "active"]);
        assert_eq!(defaults["name"], Value::Null);
        assert_eq!(defaults["active"], json!(true));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldKind::Integer.type_name(), "integer");
        assert_eq!(FieldKind::list_of(FieldKind::String).type_name(), "array");
        assert_eq!(FieldKind::object("Address").type_name(), "Address");
        assert_eq!(FieldKind::Enum(vec!["a".into()]).type_name(), "string");
    }

    #[test]
    fn test_directive_deserializes_without_form() {
        let directive: RequestDirective = serde_json::from_str("{}").unwrap();
        assert_eq!(directive, RequestDirective::new());

        let directive: RequestDirective =
            serde_json::from_value(json!({"form": "profile_form"})).unwrap();
        assert_eq!(directive, RequestDirective::with_form("profile_form"));
    }
}
