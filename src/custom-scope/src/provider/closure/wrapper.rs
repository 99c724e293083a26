use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::resolver::{Context, ResolveError};
use crate::container::{Managed, SharedManaged};
use crate::provider::closure::Closure;
use crate::provider::{flatten_construction, TypedProvider, TypedSharedProvider};

/// A [`Provider`] which supplies objects from a [`Closure`].
///
/// Note that each argument of the closure is fetched without specifying a
/// qualifier.
///
/// # Examples
///
/// ```rust
/// # use std::convert::Infallible;
/// # use custom_scope::provider::closure::ClosureProvider;
/// let closure = |a: i32, b: f64| Ok::<_, Infallible>((a, b));
/// let provider = ClosureProvider::new(closure);
/// ```
///
/// [`Provider`]: crate::provider::Provider
pub struct ClosureProvider<T, C, D>
where
    T: Managed,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    closure: C,
    _marker: PhantomData<fn() -> (T, D)>,
}

impl<T, C, D> ClosureProvider<T, C, D>
where
    T: Managed,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    /// Creates a new [`ClosureProvider`] from a [`Closure`].
    pub fn new(closure: C) -> Self {
        Self {
            closure,
            _marker: PhantomData,
        }
    }
}

impl<T, C, D> Debug for ClosureProvider<T, C, D>
where
    T: Managed,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClosureProvider<T, C, D>")
            .finish_non_exhaustive()
    }
}

impl<T, C, D> TypedProvider for ClosureProvider<T, C, D>
where
    T: Managed,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    type Output = T;

    fn provide(&self, context: &Context) -> Result<Self::Output, ResolveError> {
        flatten_construction(self.closure.run(context), context)
    }
}

impl<T, C, D> TypedSharedProvider for ClosureProvider<T, C, D>
where
    T: SharedManaged,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
}

#[cfg(test)]
mod tests {
    use crate::container::resolver::MockResolver;
    use crate::key;
    use crate::provider::testing::make_context;

    use super::*;

    #[test]
    fn closure_provider_succeeds() {
        let mut kernel = MockResolver::new();
        kernel
            .expect_resolve()
            .returning(|_| Ok(vec![Box::new(42i32) as Box<dyn Managed>]));
        let context = make_context(kernel, key::of::<i32>(), Vec::new());

        let provider = ClosureProvider::new(|v: i32| Ok::<_, &str>(v));
        assert_eq!(provider.provide(&context).unwrap(), 42);
        assert_eq!(provider.provide(&context).unwrap(), 42);
    }

    #[test]
    fn closure_provider_wraps_construction_error() {
        let context = make_context(MockResolver::new(), key::named::<i32>("odd"), Vec::new());

        let provider = ClosureProvider::new(|| Err::<i32, _>("not odd"));
        let err = provider.provide(&context).unwrap_err();
        assert!(matches!(err, ResolveError::ObjectConstruction { .. }));
        assert_eq!(err.to_string(), "could not construct the object i32@\"odd\"");
    }
}
