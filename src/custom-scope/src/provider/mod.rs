pub mod closure;
pub mod component;
pub mod instance;
pub mod method;

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use crate::container::resolver::{Context, ResolveError};
use crate::container::{Managed, SharedManaged};

/// A universal factory which constructs objects of one type.
///
/// A [`Provider`] is responsible for constructing an object on each request
/// and retrieving all dependencies through the [`Context`] of the
/// activation.
///
/// In convention, a [`Provider`] is a stateless object and may be used by
/// multiple threads. Each request to a [`Provider`] should receive a new
/// object. Sharing objects is the kernel's business: shared bindings cache
/// what their provider returns under the scope chosen for the activation.
///
/// Usually, you don't need to implement [`Provider`] manually, since this is
/// automatically done by [`TypedProvider`]'s blanket implementation.
pub trait Provider: Debug + Send + Sync + 'static {
    /// Provides a newly created type-erased object.
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide(&self, context: &Context) -> Result<Box<dyn Managed>, ResolveError>;
}

/// A static variant of the [`Provider`] trait, leveraging static dispatch and
/// type-safety.
pub trait TypedProvider: Provider {
    /// The return type in response to each request to the provider.
    type Output: Managed;

    /// Provides a newly created object of type [`TypedProvider::Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched or the object
    /// construction fails.
    fn provide(&self, context: &Context) -> Result<Self::Output, ResolveError>;
}

impl<T: TypedProvider> Provider for T {
    fn dyn_provide(&self, context: &Context) -> Result<Box<dyn Managed>, ResolveError> {
        self.provide(context)
            .map(|obj| -> Box<dyn Managed> { Box::new(obj) })
    }
}

/// A variant of the [`Provider`] trait, which produces a shareable object.
pub trait SharedProvider: Provider {
    /// Provides a newly created shareable type-erased object.
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide_shared(&self, context: &Context)
        -> Result<Box<dyn SharedManaged>, ResolveError>;

    /// Returns a reference to `self` as a [`Provider`].
    fn upcast_provider(&self) -> &dyn Provider;
}

/// A static variant of the [`SharedProvider`] trait.
pub trait TypedSharedProvider
where
    Self: SharedProvider + TypedProvider<Output: SharedManaged>,
{
}

impl<T: TypedSharedProvider> SharedProvider for T {
    fn dyn_provide_shared(
        &self,
        context: &Context,
    ) -> Result<Box<dyn SharedManaged>, ResolveError> {
        self.provide(context)
            .map(|obj| -> Box<dyn SharedManaged> { Box::new(obj) })
    }

    fn upcast_provider(&self) -> &dyn Provider {
        self
    }
}

/// Turns the nested result of a user-supplied constructor into the result of
/// a provider, wrapping construction errors with the key of the binding.
pub(crate) fn flatten_construction<T, E>(
    res: Result<Result<T, E>, ResolveError>,
    context: &Context,
) -> Result<T, ResolveError>
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    match res {
        Ok(Ok(obj)) => Ok(obj),
        Ok(Err(err)) => Err(ResolveError::ObjectConstruction {
            key: context.binding().key().dyn_clone(),
            source: Arc::from(err.into()),
        }),
        Err(err) => Err(err),
    }
}
