use crate::errors::BindingError;
use crate::metadata::ArgumentMetadata;
use crate::request::RequestSource;
use crate::types::{BindingOutcome, BoundInstance};

/// One link of the argument resolver chain.
pub trait ValueResolver: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(Skipped)` passes the argument to the next resolver.
    fn bind(
        &self,
        request: &dyn RequestSource,
        argument: &ArgumentMetadata,
    ) -> Result<BindingOutcome, BindingError>;
}

/// Ordered resolver chain. The first resolver that does not skip decides.
#[derive(Default)]
pub struct ArgumentResolver {
    resolvers: Vec<Box<dyn ValueResolver>>,
}

impl ArgumentResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resolver: Box<dyn ValueResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn with(mut self, resolver: impl ValueResolver + 'static) -> Self {
        self.register(Box::new(resolver));
        self
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// **ARGUMENT RESOLUTION**
    ///
    /// **RETURNS**:
    /// - `Ok(Some(..))` - Bound by the first resolver that accepted the argument
    /// - `Ok(None)` - Every resolver skipped
    /// - `Err(BindingError::Validation)` - The accepting resolver rejected the payload
    pub fn resolve(
        &self,
        request: &dyn RequestSource,
        argument: &ArgumentMetadata,
    ) -> Result<Option<BoundInstance>, BindingError> {
        for resolver in &self.resolvers {
            let outcome = resolver.bind(request, argument)?;
            if outcome.is_skipped() {
                continue;
            }
            log::trace!(
                "argument '{}' handled by resolver '{}'",
                argument.name,
                resolver.name()
            );
            return outcome.into_result();
        }
        Ok(None)
    }
}
