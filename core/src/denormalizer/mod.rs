//! # DENORMALIZATION
//!
//! **PURPOSE**: Converts a raw request mapping into an instance of a
//! registered type, collecting every field that could not be converted.

use crate::request::ContentFormat;
use crate::types::RawPayload;
use serde_json::Value;
use thiserror::Error;

pub mod adapter;
pub mod schema;

pub use adapter::{violation_from_error, violations_from_partial};
pub use schema::{coerce, json_type_name, CoercionFailure, SchemaDenormalizer};

/// Wire format the payload was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    /// Delimited/tabular format: every scalar arrives as a string.
    Csv,
}

impl Format {
    pub fn for_content(format: Option<&ContentFormat>) -> Self {
        match format {
            Some(ContentFormat::Json) => Format::Json,
            _ => Format::Csv,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

/// Options recognised by `Denormalizer::denormalize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenormalizationContext {
    /// Coerce numeric and boolean strings in every format, not only `csv`.
    pub disable_type_enforcement: bool,
    /// Report all failing fields instead of stopping at the first.
    pub collect_errors: bool,
}

impl DenormalizationContext {
    /// Options used for request binding.
    pub const REQUEST: Self = Self {
        disable_type_enforcement: true,
        collect_errors: true,
    };
}

/// A single field whose raw value could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotNormalizableValue {
    pub path: String,
    pub expected_types: Vec<String>,
    pub current_type: String,
    pub message: String,
    /// `message` is safe to show to the client.
    pub user_safe: bool,
}

/// Partially built instance plus the fields that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialDenormalization {
    pub data: Option<Value>,
    pub errors: Vec<NotNormalizableValue>,
}

#[derive(Debug, Error)]
pub enum DenormalizeError {
    #[error("{} field(s) could not be denormalized", .0.errors.len())]
    Partial(PartialDenormalization),

    #[error("field '{}' could not be denormalized: {}", .0.path, .0.message)]
    NotNormalizable(NotNormalizableValue),

    #[error("type '{0}' is not registered")]
    UnknownType(String),
}

/// **DENORMALIZER CONTRACT**
pub trait Denormalizer: Send + Sync {
    fn denormalize(
        &self,
        payload: &RawPayload,
        type_name: &str,
        format: Format,
        context: DenormalizationContext,
    ) -> Result<Value, DenormalizeError>;
}
