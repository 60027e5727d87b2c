use crate::metadata::FieldKind;

pub const DEFAULT_INVALID_MESSAGE: &str = "This value is not valid.";

#[derive(Debug, Clone, PartialEq)]
pub enum FormFieldKind {
    /// Leaf field holding a value of the given kind.
    Scalar(FieldKind),
    /// Sub-form with its own fields.
    Compound(Vec<FormField>),
}

/// One field of a form definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub kind: FormFieldKind,
    /// Errors on this field are attached to its parent instead.
    pub error_bubbling: bool,
    pub invalid_message: Option<String>,
}

impl FormField {
    pub fn scalar(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind: FormFieldKind::Scalar(kind),
            error_bubbling: false,
            invalid_message: None,
        }
    }

    pub fn compound(name: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            name: name.into(),
            kind: FormFieldKind::Compound(fields),
            error_bubbling: false,
            invalid_message: None,
        }
    }

    pub fn error_bubbling(mut self, enabled: bool) -> Self {
        self.error_bubbling = enabled;
        self
    }

    pub fn invalid_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_message = Some(message.into());
        self
    }
}

/// **FORM DEFINITION**
///
/// A named, registrable form. `name` is the root form's name and is never
/// part of error keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FormDefinition {
    pub id: String,
    pub name: String,
    pub fields: Vec<FormField>,
    /// Overrides the registry-wide setting when present.
    pub allow_extra_fields: Option<bool>,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
            allow_extra_fields: None,
        }
    }

    pub fn add(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn allow_extra_fields(mut self, allow: bool) -> Self {
        self.allow_extra_fields = Some(allow);
        self
    }
}
