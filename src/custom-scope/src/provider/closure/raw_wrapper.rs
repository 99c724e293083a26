use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::resolver::{Context, ResolveError};
use crate::container::{Managed, SharedManaged};
use crate::provider::closure::RawClosure;
use crate::provider::{flatten_construction, TypedProvider, TypedSharedProvider};

/// A [`Provider`] which hands the whole [`Context`] of the activation to a
/// [`RawClosure`].
///
/// [`Provider`]: crate::provider::Provider
pub struct RawClosureProvider<T, C>
where
    T: Managed,
    C: RawClosure<Constructed = T>,
{
    closure: C,
}

impl<T, C> RawClosureProvider<T, C>
where
    T: Managed,
    C: RawClosure<Constructed = T>,
{
    pub fn new(closure: C) -> Self {
        Self { closure }
    }
}

impl<T, C> Debug for RawClosureProvider<T, C>
where
    T: Managed,
    C: RawClosure<Constructed = T>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RawClosureProvider<T, C>")
            .finish_non_exhaustive()
    }
}

impl<T, C> TypedProvider for RawClosureProvider<T, C>
where
    T: Managed,
    C: RawClosure<Constructed = T>,
{
    type Output = T;

    fn provide(&self, context: &Context) -> Result<Self::Output, ResolveError> {
        flatten_construction((self.closure)(context), context)
    }
}

impl<T, C> TypedSharedProvider for RawClosureProvider<T, C>
where
    T: SharedManaged,
    C: RawClosure<Constructed = T>,
{
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;

    use crate::container::resolver::{ConstructorArgument, MockResolver, Parameter};
    use crate::key;
    use crate::provider::testing::make_context;

    use super::*;

    #[test]
    fn raw_closure_provider_reads_arguments() {
        let port: Arc<dyn Parameter> = Arc::new(ConstructorArgument::new("port", 8080u16));
        let context = make_context(MockResolver::new(), key::of::<String>(), vec![port]);

        let provider = RawClosureProvider::new(
            |context: &Context| -> Result<Result<String, Infallible>, ResolveError> {
                let port: u16 = context.require_argument("port")?;
                Ok(Ok(format!("localhost:{port}")))
            },
        );
        assert_eq!(provider.provide(&context).unwrap(), "localhost:8080");
    }

    #[test]
    fn raw_closure_provider_forwards_resolve_errors() {
        let context = make_context(MockResolver::new(), key::of::<String>(), Vec::new());

        let provider = RawClosureProvider::new(
            |context: &Context| -> Result<Result<String, Infallible>, ResolveError> {
                let port: u16 = context.require_argument("port")?;
                Ok(Ok(format!("localhost:{port}")))
            },
        );
        assert!(matches!(
            provider.provide(&context),
            Err(ResolveError::MissingArgument { .. })
        ));
    }
}
