use crate::metadata::types::{ArgumentMetadata, RequestDirective, TypeDescriptor};
use std::collections::HashMap;

/// Answers questions about registered types and argument markers.
pub trait TypeIntrospector: Send + Sync {
    fn describe(&self, type_name: &str) -> Option<&TypeDescriptor>;

    fn implements_binding_marker(&self, type_name: &str) -> bool {
        self.describe(type_name)
            .map(|descriptor| descriptor.binding_marker)
            .unwrap_or(false)
    }

    fn class_directive(&self, type_name: &str) -> Option<&RequestDirective> {
        self.describe(type_name)
            .and_then(|descriptor| descriptor.directive.as_ref())
    }

    fn parameter_directive<'a>(&self, argument: &'a ArgumentMetadata) -> Option<&'a RequestDirective> {
        argument.directives.first()
    }
}

/// Type descriptors keyed by name, populated at startup.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor`, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        if self.types.contains_key(&descriptor.name) {
            log::warn!("type descriptor '{}' registered twice", descriptor.name);
        }
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeIntrospector for TypeRegistry {
    fn describe(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = TypeRegistry::new()
            .with(TypeDescriptor::new("Signup").marker())
            .with(TypeDescriptor::new("Search").directive(RequestDirective::with_form("search")))
            .with(TypeDescriptor::new("Plain"));

        assert_eq!(registry.len(), 3);
        assert!(registry.implements_binding_marker("Signup"));
        assert!(!registry.implements_binding_marker("Plain"));
        assert!(!registry.implements_binding_marker("Unknown"));
        assert_eq!(
            registry.class_directive("Search"),
            Some(&RequestDirective::with_form("search"))
        );
        assert!(registry.class_directive("Signup").is_none());
    }

    #[test]
    fn test_parameter_directive_uses_first() {
        let registry = TypeRegistry::new();
        let argument = ArgumentMetadata::new("input", "Signup")
            .with_directive(RequestDirective::with_form("first"))
            .with_directive(RequestDirective::with_form("second"));

        assert_eq!(
            registry.parameter_directive(&argument),
            Some(&RequestDirective::with_form("first"))
        );
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeDescriptor::new("Signup"));
        registry.register(TypeDescriptor::new("Signup").marker());

        assert_eq!(registry.len(), 1);
        assert!(registry.implements_binding_marker("Signup"));
    }
}
