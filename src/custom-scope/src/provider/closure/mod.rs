mod closure_implementation;
mod raw_wrapper;
mod wrapper;

use std::error::Error;

use crate::container::resolver::{Context, ResolveError};
use crate::container::Managed;

pub use raw_wrapper::RawClosureProvider;
pub use wrapper::ClosureProvider;

/// A specialized form of [`Fn`] that can be called by supplying arguments
/// resolved through a [`Context`].
///
/// Closures of `Fn(A1, A2, ...) -> Result<T, E> + Send + Sync + 'static`
/// where `Ai: Managed` are [`Closure`]. Note that each argument is fetched
/// without specifying a qualifier, and as a dependency of the object being
/// constructed, so it is attributed to the same scope.
///
/// Usually you don't need to use a [`Closure`] directly. The most recommended
/// way is to use `to_closure()` [`dsl`]s offered by this crate. Or wrap your
/// [`Closure`] in a [`ClosureProvider`] if you need low-level control.
///
/// [`Closure`] is only implemented by closures whose arity is at most 16.
///
/// [`dsl`]: crate::module::dsl
pub trait Closure<D>
where
    Self: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    /// The successfully constructed object.
    type Constructed: Managed;

    /// The error occurred in object construction after all dependencies are
    /// retrieved.
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// Resolves the dependencies and calls `self` with them.
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched.
    ///
    /// Returns an inner error [`Closure::Error`] wrapped in the outer [`Ok`]
    /// if the object construction fails.
    fn run(
        &self,
        context: &Context,
    ) -> Result<Result<Self::Constructed, Self::Error>, ResolveError>;
}

/// A specialized form of [`Fn`] which directly accepts a [`Context`] and
/// constructs objects.
///
/// Usually you don't need to use a [`RawClosure`] directly. The most
/// recommended way is to use `to_raw_closure()` [`dsl`]s offered by this
/// crate. Or wrap your [`RawClosure`] in a [`RawClosureProvider`] if you need
/// low-level control.
///
/// [`dsl`]: crate::module::dsl
pub trait RawClosure
where
    Self: Fn(&Context) -> Result<Result<Self::Constructed, Self::Error>, ResolveError>,
    Self: Send + Sync + 'static,
{
    /// The successfully constructed object.
    type Constructed: Managed;

    /// The error occurred in object construction after all dependencies are
    /// retrieved.
    type Error: Into<Box<dyn Error + Send + Sync>>;
}

impl<F, T, E> RawClosure for F
where
    T: Managed,
    E: Into<Box<dyn Error + Send + Sync>>,
    Self: Fn(&Context) -> Result<Result<T, E>, ResolveError>,
    Self: Send + Sync + 'static,
{
    type Constructed = T;

    type Error = E;
}
