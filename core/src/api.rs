pub use crate::config::BindingConfig;
pub use crate::errors::{error_codes, BindingError};
pub use crate::form::{FormDefinition, FormField, FormRegistry};
pub use crate::metadata::{
    ArgumentMetadata, FieldDescriptor, FieldKind, RequestDirective, TypeDescriptor, TypeRegistry,
};
pub use crate::request::{HttpMethod, HttpRequest, RequestSource};
pub use crate::resolver::{ArgumentResolver, RequestValueResolver, ValueResolver};
pub use crate::response::error_response;
pub use crate::types::{BindingOutcome, BoundInstance, RawPayload};
pub use crate::validation::{Constraint, ErrorTree};
