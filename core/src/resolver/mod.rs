//! # ARGUMENT RESOLUTION
//!
//! **PURPOSE**: Decides whether a controller argument is populated from the
//! request and produces its `BindingOutcome`.
//!
//! ## FLOW
//!
//! 1. **CLASSIFY** - Marker or directive opt-in, otherwise `Skipped`
//! 2. **EXTRACT** - Payload chosen by method and content format
//! 3. **BIND** - Form submission, or denormalization followed by validation
//! 4. **AGGREGATE** - Every error lands in one `ErrorTree`

pub mod chain;
pub mod classifier;
pub mod value_resolver;

pub use chain::{ArgumentResolver, ValueResolver};
pub use classifier::{classify, Applicability, BindingTarget};
pub use value_resolver::RequestValueResolver;
