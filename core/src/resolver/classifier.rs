use crate::metadata::{ArgumentMetadata, RequestDirective, TypeIntrospector};

/// A controller argument this resolver will populate.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingTarget {
    pub argument_name: String,
    pub type_name: String,
    /// Effective directive: the parameter's own, else the type's.
    pub directive: Option<RequestDirective>,
    pub implements_marker: bool,
}

impl BindingTarget {
    /// Form definition to bind through, when the directive names one.
    pub fn form_id(&self) -> Option<&str> {
        self.directive.as_ref().and_then(|d| d.form.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Applicability {
    Applicable(BindingTarget),
    NotApplicable,
}

/// **APPLICABILITY CHECK**
///
/// An argument is applicable when its type is registered and the type
/// implements the binding marker, the type carries a directive, or the
/// parameter does. Anything else declines.
pub fn classify(types: &dyn TypeIntrospector, argument: &ArgumentMetadata) -> Applicability {
    let type_name = match argument.type_name.as_deref() {
        Some(name) if types.describe(name).is_some() => name,
        _ => return Applicability::NotApplicable,
    };

    let implements_marker = types.implements_binding_marker(type_name);
    let directive = types
        .parameter_directive(argument)
        .or_else(|| types.class_directive(type_name))
        .cloned();

    if !implements_marker && directive.is_none() {
        return Applicability::NotApplicable;
    }

    Applicability::Applicable(BindingTarget {
        argument_name: argument.name.clone(),
        type_name: type_name.to_string(),
        directive,
        implements_marker,
    })
}
