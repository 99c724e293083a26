mod context;
mod parameter;
mod request;

use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::Managed;
use crate::key::{Key, TypedKey};
use crate::util::any::Downcast;

pub use context::Context;
pub use parameter::{ConstructorArgument, Parameter};
pub use request::{key_constraint, BindingMetadata, Constraint, Request, Service};

/// Something objects can be requested from.
///
/// The kernel is the root [`Resolver`] and owns every binding. A
/// [`ScopeHandle`] is a [`Resolver`] as well, so code written against this
/// trait works unchanged whichever one it is handed.
///
/// [`ScopeHandle`]: crate::scope::ScopeHandle
#[cfg_attr(test, mockall::automock)]
pub trait Resolver: Send + Sync + 'static {
    /// Returns true if at least one binding could satisfy `request`.
    fn can_resolve(&self, request: &Request) -> bool;

    /// Activates every binding matching `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing matches a non-optional request, if several
    /// bindings match a unique request, or if an object or one of its
    /// dependencies fails to be constructed.
    fn resolve(&self, request: &Request) -> Result<Vec<Box<dyn Managed>>, ResolveError>;

    /// Builds a top-level request to be passed to [`Resolver::resolve`].
    fn create_request(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        parameters: Vec<Arc<dyn Parameter>>,
        is_optional: bool,
        is_unique: bool,
    ) -> Request;
}

pub trait TypedResolver: Resolver {
    fn get<K>(&self, key: K) -> Result<K::Target, ResolveError>
    where
        K: TypedKey,
    {
        self.get_with(key, Vec::new())
    }

    fn get_with<K>(
        &self,
        key: K,
        parameters: Vec<Arc<dyn Parameter>>,
    ) -> Result<K::Target, ResolveError>
    where
        K: TypedKey,
    {
        let service = Service::of::<K::Target>();
        let request =
            self.create_request(service, Some(key_constraint(key)), parameters, false, true);
        match self.resolve(&request)?.into_iter().next() {
            Some(object) => Ok(downcast_object(object)),
            None => Err(ResolveError::NotFound { service }),
        }
    }

    fn try_get<K>(&self, key: K) -> Result<Option<K::Target>, ResolveError>
    where
        K: TypedKey,
    {
        let service = Service::of::<K::Target>();
        let request =
            self.create_request(service, Some(key_constraint(key)), Vec::new(), true, true);
        let objects = self.resolve(&request)?;
        Ok(objects.into_iter().next().map(downcast_object))
    }

    fn get_all<T>(&self) -> Result<Vec<T>, ResolveError>
    where
        T: Managed,
    {
        let request = self.create_request(Service::of::<T>(), None, Vec::new(), true, false);
        let objects = self.resolve(&request)?;
        Ok(objects.into_iter().map(downcast_object).collect())
    }
}

impl<R> TypedResolver for R where R: Resolver + ?Sized {}

pub(crate) fn downcast_object<T: Managed>(object: Box<dyn Managed>) -> T {
    match object.downcast::<T>() {
        Ok(object) => *object,
        Err(_) => unreachable!("the object's type should be the requested service"),
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ResolveError {
    #[snafu(display("could not find any binding of {service} matching the request"))]
    #[non_exhaustive]
    NotFound { service: Service },
    #[snafu(display("found {count} bindings of {service} for a request expecting only one"))]
    #[non_exhaustive]
    Ambiguous { service: Service, count: usize },
    #[snafu(display("could not construct the object {key} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { key: Box<dyn Key> },
    #[snafu(display("the construction of {key} was aborted by a panic"))]
    #[non_exhaustive]
    ConstructionAborted { key: Box<dyn Key> },
    #[snafu(display("could not find the argument `{name}` needed by {key}"))]
    #[non_exhaustive]
    MissingArgument { name: String, key: Box<dyn Key> },
    #[snafu(display("could not construct the object {key}"))]
    #[non_exhaustive]
    ObjectConstruction {
        key: Box<dyn Key>,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl Clone for ResolveError {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound { service } => Self::NotFound { service: *service },
            Self::Ambiguous { service, count } => Self::Ambiguous {
                service: *service,
                count: *count,
            },
            Self::CyclicDependency { key } => Self::CyclicDependency {
                key: key.dyn_clone(),
            },
            Self::ConstructionAborted { key } => Self::ConstructionAborted {
                key: key.dyn_clone(),
            },
            Self::MissingArgument { name, key } => Self::MissingArgument {
                name: name.clone(),
                key: key.dyn_clone(),
            },
            Self::ObjectConstruction { key, source } => Self::ObjectConstruction {
                key: key.dyn_clone(),
                source: Arc::clone(source),
            },
        }
    }
}
