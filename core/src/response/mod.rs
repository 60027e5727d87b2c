//! # ERROR RESPONSES
//!
//! Renders binding failures for the controller boundary: 422 with the error
//! tree for validation failures, 400/500 with an error code otherwise.

pub mod error;
pub mod serializer;
pub mod types;

pub use error::error_response;
pub use serializer::{create_response, serialize_response_body};
pub use types::{HttpResponse, ResponseBody};
