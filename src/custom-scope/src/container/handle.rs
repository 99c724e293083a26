use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use tracing::debug;

use crate::container::core::KernelCore;
use crate::container::registry::{ConfigurerImpl, RegistryError};
use crate::container::resolver::{Constraint, Parameter, Request, ResolveError, Resolver, Service};
use crate::container::settings::KernelSettings;
use crate::container::Managed;
use crate::module::Module;
use crate::scope::ScopeHandle;

/// The resolution root built from a [`Module`].
///
/// Cloning a [`Kernel`] is cheap and every clone refers to the same bindings
/// and cache.
#[derive(Clone)]
pub struct Kernel {
    core: Arc<KernelCore>,
}

impl Kernel {
    /// Builds a kernel with the default [`KernelSettings`].
    ///
    /// # Errors
    ///
    /// Returns an error if a key is bound twice or `module` fails to set up
    /// its bindings.
    pub fn new<M: Module>(module: M) -> Result<Self, RegistryError> {
        Self::with_settings(module, KernelSettings::default())
    }

    /// Builds a kernel from `module`, configured by `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if a key is bound twice or `module` fails to set up
    /// its bindings.
    pub fn with_settings<M: Module>(
        module: M,
        settings: KernelSettings,
    ) -> Result<Self, RegistryError> {
        let mut configurer = ConfigurerImpl::new();
        module.setup(&mut configurer);
        let bindings = configurer.finish()?;
        debug!(
            module = module.name(),
            bindings = bindings.len(),
            ?settings,
            "kernel initialized"
        );

        Ok(Self {
            core: KernelCore::new(bindings, &settings),
        })
    }

    /// Returns the kernel as the [`Resolver`] contexts and scopes refer to.
    pub fn as_resolver(&self) -> Arc<dyn Resolver> {
        Arc::clone(&self.core) as Arc<dyn Resolver>
    }

    /// Creates a lifetime scope on top of the kernel.
    pub fn new_scope(&self) -> Arc<ScopeHandle> {
        ScopeHandle::new(self.as_resolver())
    }

    /// Releases the objects cached under every dropped scope and returns the
    /// number of released scopes.
    pub fn prune_cache(&self) -> usize {
        self.core.prune_cache()
    }

    /// Returns the number of scopes which have objects cached in the kernel,
    /// including dropped scopes which haven't been pruned yet.
    pub fn cached_scopes(&self) -> usize {
        self.core.cached_scopes()
    }
}

impl Debug for Kernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Kernel")
            .field("address", &format_args!("{:p}", Arc::as_ptr(&self.core)))
            .finish_non_exhaustive()
    }
}

impl Resolver for Kernel {
    fn can_resolve(&self, request: &Request) -> bool {
        self.core.can_resolve(request)
    }

    fn resolve(&self, request: &Request) -> Result<Vec<Box<dyn Managed>>, ResolveError> {
        self.core.resolve(request)
    }

    fn create_request(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        parameters: Vec<Arc<dyn Parameter>>,
        is_optional: bool,
        is_unique: bool,
    ) -> Request {
        self.core
            .create_request(service, constraint, parameters, is_optional, is_unique)
    }
}
