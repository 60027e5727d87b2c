//! # FORM BINDING
//!
//! **PURPOSE**: Binds a payload through a declared form instead of direct
//! denormalization, and reports errors keyed by form field.
//!
//! Forms are trees. Every node knows its parent, and errors record the node
//! they were added to. The collector flattens each origin's
//! `path_from_root()` into a single key such as `address_zip`.

use crate::errors::BindingError;
use crate::types::RawPayload;
use serde_json::Value;

pub mod collector;
pub mod definition;
pub mod registry;
pub mod tree;

pub use collector::{collect_form_errors, GLOBAL_KEY};
pub use definition::{FormDefinition, FormField, FormFieldKind};
pub use registry::FormRegistry;
pub use tree::{Form, FormNodeId};

/// An error attached to a form node.
#[derive(Debug, Clone, PartialEq)]
pub struct FormError {
    pub message: String,
    /// Names from the root's child down to the origin node; empty when the
    /// origin is the root form itself.
    pub origin: Vec<String>,
}

/// **FORM HANDLE CONTRACT**
pub trait FormHandle {
    fn name(&self) -> &str;

    /// Submits `payload`. With `clear_missing` false, fields absent from the
    /// payload keep their current data.
    fn submit(&mut self, payload: &RawPayload, clear_missing: bool) -> Result<(), BindingError>;

    fn is_submitted(&self) -> bool;

    fn is_valid(&self) -> bool;

    fn data(&self) -> Value;

    /// Errors of the root form, plus those of every descendant when
    /// `recursive`. Parents come before children, children in declaration
    /// order.
    fn errors(&self, recursive: bool) -> Vec<FormError>;
}

/// **FORM FACTORY CONTRACT**
pub trait FormFactory: Send + Sync {
    /// Instantiates form `form_id` with `data_class` as its data class.
    fn create_form(&self, form_id: &str, data_class: &str)
        -> Result<Box<dyn FormHandle>, BindingError>;
}
