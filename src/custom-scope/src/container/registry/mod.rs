mod binding_map;
mod configurer;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::resolver::{BindingMetadata, Parameter};
use crate::container::SharedManaged;
use crate::key::{Key, TypedKey};
use crate::provider::{Provider, SharedProvider, TypedProvider, TypedSharedProvider};
use crate::scope::{ScopeCallback, Scoped};

pub(crate) use binding_map::{BindingEntry, BindingKind, BindingMap};
pub(crate) use configurer::ConfigurerImpl;

/// The receiver of bindings declared by [`Module`]s.
///
/// [`Module`]: crate::module::Module
pub trait Configurer: Send + Sync + 'static {
    #[doc(hidden)]
    #[allow(private_interfaces)]
    fn as_private(&mut self) -> &mut dyn ConfigurerPrivate;

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

trait ConfigurerPrivate: Configurer {
    fn dyn_register(&mut self, metadata: BindingMetadata, provider: Box<dyn Provider>);

    fn dyn_register_shared(
        &mut self,
        metadata: BindingMetadata,
        provider: Box<dyn SharedProvider>,
        scope: ScopeCallback,
    );
}

pub trait TypedConfigurer: Configurer {
    /// Registers a binding whose objects are constructed anew for every
    /// request.
    fn register<K, P>(&mut self, key: K, provider: P)
    where
        K: TypedKey,
        P: TypedProvider<Output = K::Target>,
    {
        self.register_with(key, provider, Vec::new());
    }

    /// Like [`TypedConfigurer::register`], also attaching `parameters` to
    /// the binding.
    fn register_with<K, P>(&mut self, key: K, provider: P, parameters: Vec<Arc<dyn Parameter>>)
    where
        K: TypedKey,
        P: TypedProvider<Output = K::Target>,
    {
        let metadata = BindingMetadata::new(Box::new(key), "Transient").with_parameters(parameters);
        self.as_private().dyn_register(metadata, Box::new(provider));
    }

    /// Registers a binding whose objects are cached under the key chosen by
    /// `scope`.
    fn register_shared<K, P>(&mut self, key: K, provider: P, scope: Scoped)
    where
        K: TypedKey<Target: SharedManaged>,
        P: TypedSharedProvider<Output = K::Target>,
    {
        self.register_shared_with(key, provider, scope, Vec::new());
    }

    /// Like [`TypedConfigurer::register_shared`], also attaching `parameters`
    /// to the binding.
    fn register_shared_with<K, P>(
        &mut self,
        key: K,
        provider: P,
        scope: Scoped,
        parameters: Vec<Arc<dyn Parameter>>,
    ) where
        K: TypedKey<Target: SharedManaged>,
        P: TypedSharedProvider<Output = K::Target>,
    {
        let metadata = BindingMetadata::new(Box::new(key), scope.label()).with_parameters(parameters);
        self.as_private()
            .dyn_register_shared(metadata, Box::new(provider), scope.into_callback());
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("the key {key} already exists in the registry"))]
    #[non_exhaustive]
    KeyDuplicated { key: Box<dyn Key> },
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

impl RegistryError {
    /// Collapses errors reported while configuring a kernel into one.
    pub(crate) fn aggregate(mut errors: Vec<RegistryError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregated { errors }),
        }
    }
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
