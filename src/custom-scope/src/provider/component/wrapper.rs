use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::resolver::{Context, ResolveError};
use crate::container::SharedManaged;
use crate::provider::component::Component;
use crate::provider::{flatten_construction, TypedProvider, TypedSharedProvider};

pub struct ComponentProvider<C>
where
    C: Component,
{
    _marker: PhantomData<fn() -> C>,
}

impl<C> ComponentProvider<C>
where
    C: Component,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C> Debug for ComponentProvider<C>
where
    C: Component,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentProvider<C>")
            .finish_non_exhaustive()
    }
}

impl<C> TypedProvider for ComponentProvider<C>
where
    C: Component,
{
    type Output = C::Constructed;

    fn provide(&self, context: &Context) -> Result<Self::Output, ResolveError> {
        flatten_construction(C::construct(context), context).map(C::post_process)
    }
}

impl<C> TypedSharedProvider for ComponentProvider<C> where C: Component<Constructed: SharedManaged> {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::resolver::MockResolver;
    use crate::container::Managed;
    use crate::key;
    use crate::provider::testing::make_context;
    use crate::provider::SharedProvider;

    use super::*;

    pub trait Abstract: Send + Sync + 'static {
        fn value(&self) -> i32;
    }

    pub struct Impl {
        value: i32,
    }

    impl Abstract for Impl {
        fn value(&self) -> i32 {
            self.value
        }
    }

    impl Component for Impl {
        type Constructed = Arc<dyn Abstract>;

        type Error = String;

        fn construct(context: &Context) -> Result<Result<Self, Self::Error>, ResolveError> {
            let value: i32 = context.get(key::of())?;
            if value < 0 {
                Ok(Err(format!("{value} is negative")))
            } else {
                Ok(Ok(Impl { value }))
            }
        }

        fn post_process(self) -> Self::Constructed {
            Arc::new(self)
        }
    }

    fn kernel_returning(value: i32) -> MockResolver {
        let mut kernel = MockResolver::new();
        kernel
            .expect_resolve()
            .returning(move |_| Ok(vec![Box::new(value) as Box<dyn Managed>]));
        kernel
    }

    #[test]
    fn component_provider_succeeds() {
        let context = make_context(kernel_returning(7), key::of::<Arc<dyn Abstract>>(), Vec::new());
        let provider = ComponentProvider::<Impl>::new();

        assert_eq!(provider.provide(&context).unwrap().value(), 7);
        assert_is_shared_provider(&provider);
    }

    #[test]
    fn component_provider_wraps_construction_error() {
        let context = make_context(kernel_returning(-1), key::of::<Arc<dyn Abstract>>(), Vec::new());
        let provider = ComponentProvider::<Impl>::new();

        assert!(matches!(
            provider.provide(&context),
            Err(ResolveError::ObjectConstruction { .. })
        ));
    }

    fn assert_is_shared_provider(_: &dyn SharedProvider) {}
}
