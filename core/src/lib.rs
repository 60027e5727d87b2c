//! # FORZIUM BINDING LIBRARY
//!
//! **REQUEST BINDING AND VALIDATION FOR CONTROLLER ARGUMENTS**
//!
//! **ARCHITECTURE**: Registry-driven metadata with trait seams for the
//! denormalizer, the validator and the form engine
//! **GUARANTEE**: Every field error of a request is reported at once, keyed by
//! property path
//! **CONCURRENCY**: Resolvers hold no per-request state and are `Send + Sync`

pub mod api;
pub mod config;
pub mod denormalizer;
pub mod errors;
pub mod form;
pub mod metadata;
pub mod request;
pub mod resolver;
pub mod response;
pub mod types;

// **VALIDATION MODULE REGISTRATION**
pub mod validation;
