use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::resolver::{Context, ResolveError};
use crate::container::{Managed, SharedManaged};
use crate::provider::{TypedProvider, TypedSharedProvider};

/// A [`Provider`] calling an infallible function of the [`Context`].
///
/// This is the way to bind a type to something derived from the activation
/// itself rather than to a constructor, e.g. `Arc<dyn Resolver>` to the
/// resolver the request came from.
///
/// [`Provider`]: crate::provider::Provider
pub struct MethodProvider<T, F>
where
    T: Managed,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
    method: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> MethodProvider<T, F>
where
    T: Managed,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
    pub fn new(method: F) -> Self {
        Self {
            method,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Debug for MethodProvider<T, F>
where
    T: Managed,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MethodProvider<T, F>")
            .finish_non_exhaustive()
    }
}

impl<T, F> TypedProvider for MethodProvider<T, F>
where
    T: Managed,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
    type Output = T;

    fn provide(&self, context: &Context) -> Result<Self::Output, ResolveError> {
        Ok((self.method)(context))
    }
}

impl<T, F> TypedSharedProvider for MethodProvider<T, F>
where
    T: SharedManaged,
    F: Fn(&Context) -> T + Send + Sync + 'static,
{
}

#[cfg(test)]
mod tests {
    use crate::container::resolver::MockResolver;
    use crate::key;
    use crate::provider::testing::make_context;

    use super::*;

    #[test]
    fn method_provider_succeeds() {
        let context = make_context(MockResolver::new(), key::named::<usize>("depth"), Vec::new());

        let provider = MethodProvider::new(|context: &Context| context.request().depth() + 1);
        assert_eq!(provider.provide(&context).unwrap(), 1);
    }
}
