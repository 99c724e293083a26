pub mod registry;
pub mod resolver;

mod cache;
mod core;
mod handle;
mod pruner;
mod settings;

use std::sync::Arc;

use crate::util::any::AsAny;

pub use handle::Kernel;
pub use settings::KernelSettings;

pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// A [`Managed`] object whose clones share one underlying value, so the
/// kernel can cache it and hand out copies.
pub trait SharedManaged: Managed {
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed>;
}

impl<T> SharedManaged for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }

    fn upcast_managed(self: Box<Self>) -> Box<dyn Managed> {
        self
    }
}
