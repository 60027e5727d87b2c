use crate::validation::ErrorTree;
use thiserror::Error;

/// Terminal error of a binding attempt.
///
/// Only `Validation` is an expected outcome; the other variants describe a
/// request that could not be read or a resolver that was wired incorrectly.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("Validation error")]
    Validation { errors: ErrorTree },

    #[error("MALFORMED PAYLOAD: {code} - {message}")]
    MalformedPayload { code: String, message: String },

    #[error("CONFIGURATION ERROR: {code} - {message}")]
    Configuration { code: String, message: String },
}

impl BindingError {
    pub fn malformed(code: &str, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn configuration(code: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// HTTP status carried by this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::MalformedPayload { .. } => 400,
            Self::Configuration { .. } => 500,
        }
    }

    /// Nested error tree of a validation failure.
    pub fn errors(&self) -> Option<&ErrorTree> {
        match self {
            Self::Validation { errors } => Some(errors),
            _ => None,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Validation { .. } => error_codes::VALIDATION_FAILED,
            Self::MalformedPayload { code, .. } | Self::Configuration { code, .. } => code,
        }
    }
}

/// **STANDARDIZED ERROR CODES**
pub mod error_codes {
    pub const VALIDATION_FAILED: &str = "RUST_BINDING_VALIDATION_FAILED";
    pub const BODY_TOO_LARGE: &str = "RUST_BINDING_BODY_TOO_LARGE";
    pub const INVALID_JSON: &str = "RUST_BINDING_INVALID_JSON";
    pub const JSON_NOT_MAPPING: &str = "RUST_BINDING_JSON_NOT_MAPPING";
    pub const INVALID_UTF8: &str = "RUST_BINDING_INVALID_UTF8";
    pub const UNKNOWN_FORM: &str = "RUST_BINDING_UNKNOWN_FORM";
    pub const UNKNOWN_TYPE: &str = "RUST_BINDING_UNKNOWN_TYPE";
    pub const INVALID_PATTERN: &str = "RUST_BINDING_INVALID_PATTERN";
    pub const INVALID_HTTP_METHOD: &str = "RUST_BINDING_INVALID_HTTP_METHOD";
    pub const INVALID_CONFIG: &str = "RUST_BINDING_INVALID_CONFIG";
}
