use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::iter;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::container::registry::Configurer;
use crate::container::resolver::{
    Constraint, Context, Parameter, Request, ResolveError, Resolver, Service,
};
use crate::container::Managed;
use crate::module::{bind, Module};

/// An explicit lifetime scope.
///
/// A [`ScopeHandle`] resolves objects exactly like the resolver it wraps,
/// except that every request it creates carries a hidden marker naming the
/// handle. The marker is inherited by the requests for all dependencies, so
/// bindings declared with `in_custom_scope()` anywhere in the object graph
/// are cached under this handle. Those objects are released once the last
/// reference to the handle is dropped and the kernel's cache is pruned.
///
/// Handles can be nested with [`ScopeHandle::new_scope`]. A request carries
/// the marker of the innermost handle it was created through.
pub struct ScopeHandle {
    parent: Arc<dyn Resolver>,
    this: Weak<ScopeHandle>,
}

impl ScopeHandle {
    pub fn new(parent: Arc<dyn Resolver>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            parent,
            this: Weak::clone(this),
        })
    }

    pub fn parent(&self) -> &Arc<dyn Resolver> {
        &self.parent
    }

    /// Creates a scope nested in `self`.
    pub fn new_scope(self: &Arc<Self>) -> Arc<Self> {
        Self::new(Arc::clone(self) as Arc<dyn Resolver>)
    }
}

impl Resolver for ScopeHandle {
    fn can_resolve(&self, request: &Request) -> bool {
        self.parent.can_resolve(request)
    }

    fn resolve(&self, request: &Request) -> Result<Vec<Box<dyn Managed>>, ResolveError> {
        self.parent.resolve(request)
    }

    fn create_request(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        parameters: Vec<Arc<dyn Parameter>>,
        is_optional: bool,
        is_unique: bool,
    ) -> Request {
        let parameters = if parameters.iter().any(|p| p.is::<ScopeParameter>()) {
            parameters
        } else {
            let marker: Arc<dyn Parameter> = Arc::new(ScopeParameter::new(self.this.clone()));
            iter::once(marker).chain(parameters).collect()
        };
        self.parent
            .create_request(service, constraint, parameters, is_optional, is_unique)
    }
}

impl Debug for ScopeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScopeHandle")
            .field("address", &format_args!("{:p}", self.this.as_ptr()))
            .finish_non_exhaustive()
    }
}

/// Returns the resolver an activation belongs to: the innermost live
/// [`ScopeHandle`] the request was created through, or the kernel.
pub fn resolution_root_from_context(context: &Context) -> Arc<dyn Resolver> {
    let scope = context
        .parameters()
        .find_map(|parameter| parameter.downcast_ref::<ScopeParameter>())
        .and_then(ScopeParameter::scope);

    match scope {
        Some(scope) => scope,
        None => {
            trace!(key = %context.binding().key(), "no live scope marker, falling back to the kernel");
            Arc::clone(context.kernel())
        }
    }
}

/// Binds `Arc<dyn Resolver>` to the resolver of the current activation, so
/// components can ask for "the resolver they were created by".
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionRootModule;

impl Module for ResolutionRootModule {
    fn configure(&self, configurer: &mut dyn Configurer) -> Result<(), Box<dyn Error + Send + Sync>> {
        bind::<Arc<dyn Resolver>>()
            .to_method(resolution_root_from_context)
            .set_on(configurer);
        Ok(())
    }
}

struct ScopeParameter {
    scope: Weak<dyn Resolver>,
}

impl ScopeParameter {
    const NAME: &'static str = "<custom-scope marker>";

    fn new(scope: Weak<dyn Resolver>) -> Self {
        Self { scope }
    }

    fn scope(&self) -> Option<Arc<dyn Resolver>> {
        self.scope.upgrade()
    }
}

impl Debug for ScopeParameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScopeParameter")
            .field("alive", &(self.scope.strong_count() > 0))
            .finish()
    }
}

impl Parameter for ScopeParameter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn should_inherit(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;

    use crate::container::resolver::{BindingMetadata, ConstructorArgument, MockResolver};
    use crate::key;

    use super::*;

    fn make_parent() -> MockResolver {
        let mut parent = MockResolver::new();
        parent
            .expect_create_request()
            .returning(|service, constraint, parameters, is_optional, is_unique| {
                Request::new(service, constraint, parameters, is_optional, is_unique)
            });
        parent
    }

    fn marker_of(request: &Request) -> Option<&ScopeParameter> {
        request
            .parameters()
            .iter()
            .find_map(|parameter| parameter.downcast_ref::<ScopeParameter>())
    }

    fn make_context(kernel: Arc<dyn Resolver>, request: Request) -> Context {
        let binding = BindingMetadata::new(Box::new(key::of::<Arc<dyn Resolver>>()), "Transient");
        Context::new(kernel, request, Arc::new(binding))
    }

    fn is_same<T: ?Sized, U: ?Sized>(first: &Arc<T>, second: &Arc<U>) -> bool {
        ptr::addr_eq(Arc::as_ptr(first), Arc::as_ptr(second))
    }

    #[test]
    fn scope_handle_delegates_resolution_to_parent() {
        let mut parent = MockResolver::new();
        parent.expect_can_resolve().times(1).returning(|_| true);
        parent
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(vec![Box::new(5u8) as Box<dyn Managed>]));
        let scope = ScopeHandle::new(Arc::new(parent));
        let request = Request::new(Service::of::<u8>(), None, Vec::new(), false, true);

        assert!(scope.can_resolve(&request));
        let objects = scope.resolve(&request).unwrap();
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn scope_handle_create_request_prepends_marker() {
        let scope = ScopeHandle::new(Arc::new(make_parent()));
        let argument: Arc<dyn Parameter> = Arc::new(ConstructorArgument::new("port", 80u16));

        let request = scope.create_request(Service::of::<u8>(), None, vec![argument], true, false);

        assert_eq!(request.parameters().len(), 2);
        assert!(request.parameters()[0].is::<ScopeParameter>());
        assert!(request.parameters()[0].should_inherit());
        assert_eq!(request.parameters()[1].name(), "port");
        assert!(request.is_optional());
        assert!(!request.is_unique());

        let marked = marker_of(&request).and_then(ScopeParameter::scope).unwrap();
        assert!(is_same(&marked, &scope));
    }

    #[test]
    fn scope_handle_nested_scope_keeps_innermost_marker() {
        let outer = ScopeHandle::new(Arc::new(make_parent()));
        let inner = outer.new_scope();

        let request = inner.create_request(Service::of::<u8>(), None, Vec::new(), false, true);

        let markers = request
            .parameters()
            .iter()
            .filter(|parameter| parameter.is::<ScopeParameter>())
            .count();
        assert_eq!(markers, 1);
        let marked = marker_of(&request).and_then(ScopeParameter::scope).unwrap();
        assert!(is_same(&marked, &inner));
        assert!(!is_same(&marked, &outer));
    }

    #[test]
    fn scope_handle_marker_does_not_keep_scope_alive() {
        let scope = ScopeHandle::new(Arc::new(make_parent()));
        let request = scope.create_request(Service::of::<u8>(), None, Vec::new(), false, true);
        let weak = Arc::downgrade(&scope);

        drop(scope);

        assert!(weak.upgrade().is_none());
        assert!(marker_of(&request).and_then(ScopeParameter::scope).is_none());
    }

    #[test]
    fn resolution_root_from_context_returns_marked_scope() {
        let kernel: Arc<dyn Resolver> = Arc::new(MockResolver::new());
        let scope = ScopeHandle::new(Arc::new(make_parent()));
        let request = scope.create_request(Service::of::<u8>(), None, Vec::new(), false, true);
        let child = request.create_child(
            Service::of::<Arc<dyn Resolver>>(),
            None,
            false,
            true,
            &key::of::<u8>(),
        );

        let root = resolution_root_from_context(&make_context(Arc::clone(&kernel), child));
        assert!(is_same(&root, &scope));
        assert!(!is_same(&root, &kernel));
    }

    #[test]
    fn resolution_root_from_context_falls_back_to_kernel() {
        let kernel: Arc<dyn Resolver> = Arc::new(MockResolver::new());
        let request = Request::new(Service::of::<u8>(), None, Vec::new(), false, true);

        let root = resolution_root_from_context(&make_context(Arc::clone(&kernel), request));
        assert!(is_same(&root, &kernel));
    }

    #[test]
    fn resolution_root_from_context_falls_back_when_scope_is_dropped() {
        let kernel: Arc<dyn Resolver> = Arc::new(MockResolver::new());
        let scope = ScopeHandle::new(Arc::new(make_parent()));
        let request = scope.create_request(Service::of::<u8>(), None, Vec::new(), false, true);
        drop(scope);

        let root = resolution_root_from_context(&make_context(Arc::clone(&kernel), request));
        assert!(is_same(&root, &kernel));
    }
}
