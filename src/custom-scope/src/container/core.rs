use std::sync::{Arc, Weak};

use tracing::trace;

use crate::container::cache::ScopeCache;
use crate::container::pruner::CachePruner;
use crate::container::registry::{BindingEntry, BindingKind, BindingMap};
use crate::container::resolver::{
    Constraint, Context, Parameter, Request, ResolveError, Resolver, Service,
};
use crate::container::settings::KernelSettings;
use crate::container::Managed;

/// The resolution root: owns every binding and the cache of shared objects.
pub struct KernelCore {
    this: Weak<KernelCore>,
    bindings: BindingMap,
    cache: Arc<ScopeCache>,
    _pruner: Option<CachePruner>,
}

impl KernelCore {
    pub fn new(bindings: BindingMap, settings: &KernelSettings) -> Arc<Self> {
        let cache = Arc::new(ScopeCache::new());
        let pruner = settings
            .cache_pruning_interval()
            .and_then(|interval| CachePruner::spawn(Arc::downgrade(&cache), interval));

        Arc::new_cyclic(|this| Self {
            this: Weak::clone(this),
            bindings,
            cache,
            _pruner: pruner,
        })
    }

    /// Returns `self` as the root every [`Context`] refers to.
    pub fn as_resolver(&self) -> Arc<dyn Resolver> {
        match self.this.upgrade() {
            Some(this) => this,
            None => unreachable!("the kernel should be alive while it is resolving"),
        }
    }

    /// Releases the objects cached under every dropped scope and returns the
    /// number of released scopes.
    pub fn prune_cache(&self) -> usize {
        self.cache.prune()
    }

    /// Returns the number of scopes which have objects cached in the kernel.
    pub fn cached_scopes(&self) -> usize {
        self.cache.len()
    }

    fn matching<'a>(&'a self, request: &'a Request) -> impl Iterator<Item = &'a BindingEntry> {
        self.bindings
            .bindings_of(request.service().id())
            .iter()
            .filter(|entry| request.matches(entry.metadata()))
    }

    fn activate(
        &self,
        entry: &BindingEntry,
        request: &Request,
    ) -> Result<Box<dyn Managed>, ResolveError> {
        let key = entry.key();
        if request.is_activating(key) {
            return Err(ResolveError::CyclicDependency {
                key: key.dyn_clone(),
            });
        }

        let context = Context::new(
            self.as_resolver(),
            request.clone(),
            Arc::clone(entry.metadata()),
        );

        match entry.kind() {
            BindingKind::Shared { provider, scope } => match scope(&context) {
                Some(scope) => self.cache.get_or_create(&scope, key, || {
                    provider.dyn_provide_shared(&context)
                }),
                None => provider.upcast_provider().dyn_provide(&context),
            },
            BindingKind::Owned { provider } => provider.dyn_provide(&context),
        }
    }
}

impl Resolver for KernelCore {
    fn can_resolve(&self, request: &Request) -> bool {
        self.matching(request).next().is_some()
    }

    fn resolve(&self, request: &Request) -> Result<Vec<Box<dyn Managed>>, ResolveError> {
        let entries: Vec<_> = self.matching(request).collect();
        trace!(
            service = %request.service(),
            depth = request.depth(),
            matches = entries.len(),
            "resolving request"
        );

        match entries.len() {
            0 if request.is_optional() => Ok(Vec::new()),
            0 => Err(ResolveError::NotFound {
                service: request.service(),
            }),
            count if count > 1 && request.is_unique() => Err(ResolveError::Ambiguous {
                service: request.service(),
                count,
            }),
            _ => entries
                .into_iter()
                .map(|entry| self.activate(entry, request))
                .collect(),
        }
    }

    fn create_request(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        parameters: Vec<Arc<dyn Parameter>>,
        is_optional: bool,
        is_unique: bool,
    ) -> Request {
        Request::new(service, constraint, parameters, is_optional, is_unique)
    }
}
