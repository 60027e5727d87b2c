pub mod registry;
pub mod types;

pub use registry::{TypeIntrospector, TypeRegistry};
pub use types::{ArgumentMetadata, FieldDescriptor, FieldKind, RequestDirective, TypeDescriptor};
