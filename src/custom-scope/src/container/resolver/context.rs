use std::sync::Arc;

use crate::container::resolver::{
    downcast_object, key_constraint, BindingMetadata, Constraint, ConstructorArgument, Parameter,
    Request, ResolveError, Resolver, Service,
};
use crate::container::Managed;
use crate::key::TypedKey;

/// Everything a provider knows while activating one binding for one request.
///
/// Dependencies fetched through a [`Context`] are requested with child
/// requests sent straight to the kernel, so inherited parameters of the
/// current request (such as the marker of the scope that issued it) follow
/// the whole object graph.
pub struct Context {
    kernel: Arc<dyn Resolver>,
    request: Request,
    binding: Arc<BindingMetadata>,
}

impl Context {
    pub fn new(kernel: Arc<dyn Resolver>, request: Request, binding: Arc<BindingMetadata>) -> Self {
        Self {
            kernel,
            request,
            binding,
        }
    }

    /// Returns the root resolver which owns all bindings.
    pub fn kernel(&self) -> &Arc<dyn Resolver> {
        &self.kernel
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn binding(&self) -> &BindingMetadata {
        &self.binding
    }

    /// Iterates the request's parameters first, then the binding's.
    pub fn parameters(&self) -> impl Iterator<Item = &Arc<dyn Parameter>> {
        self.request
            .parameters()
            .iter()
            .chain(self.binding.parameters())
    }

    pub fn argument<T>(&self, name: &str) -> Option<T>
    where
        T: Managed + Clone,
    {
        self.parameters()
            .filter(|parameter| parameter.name() == name)
            .find_map(|parameter| parameter.downcast_ref::<ConstructorArgument<T>>())
            .map(|argument| argument.value().clone())
    }

    pub fn require_argument<T>(&self, name: &str) -> Result<T, ResolveError>
    where
        T: Managed + Clone,
    {
        self.argument(name)
            .ok_or_else(|| ResolveError::MissingArgument {
                name: name.to_owned(),
                key: self.binding.key().dyn_clone(),
            })
    }

    pub fn create_child_request(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        is_optional: bool,
        is_unique: bool,
    ) -> Request {
        self.request.create_child(
            service,
            constraint,
            is_optional,
            is_unique,
            self.binding.key(),
        )
    }

    pub fn get<K>(&self, key: K) -> Result<K::Target, ResolveError>
    where
        K: TypedKey,
    {
        let service = Service::of::<K::Target>();
        let request = self.create_child_request(service, Some(key_constraint(key)), false, true);
        match self.kernel.resolve(&request)?.into_iter().next() {
            Some(object) => Ok(downcast_object(object)),
            None => Err(ResolveError::NotFound { service }),
        }
    }

    pub fn try_get<K>(&self, key: K) -> Result<Option<K::Target>, ResolveError>
    where
        K: TypedKey,
    {
        let service = Service::of::<K::Target>();
        let request = self.create_child_request(service, Some(key_constraint(key)), true, true);
        let objects = self.kernel.resolve(&request)?;
        Ok(objects.into_iter().next().map(downcast_object))
    }

    pub fn get_all<T>(&self) -> Result<Vec<T>, ResolveError>
    where
        T: Managed,
    {
        let request = self.create_child_request(Service::of::<T>(), None, true, false);
        let objects = self.kernel.resolve(&request)?;
        Ok(objects.into_iter().map(downcast_object).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::container::resolver::MockResolver;
    use crate::key::{self, Key};

    use super::*;

    fn make_context(kernel: MockResolver, parameters: Vec<Arc<dyn Parameter>>) -> Context {
        let request = Request::new(Service::of::<u64>(), None, parameters, false, true);
        let retries: Arc<dyn Parameter> = Arc::new(ConstructorArgument::new("retries", 3u8));
        let binding = BindingMetadata::new(Box::new(key::of::<u64>()), "Transient")
            .with_parameters(vec![retries]);
        Context::new(Arc::new(kernel), request, Arc::new(binding))
    }

    #[test]
    fn context_argument_prefers_request_parameters() {
        let parameters: Vec<Arc<dyn Parameter>> = vec![
            Arc::new(ConstructorArgument::new("retries", 5u8)),
            Arc::new(ConstructorArgument::new("name", "worker")),
        ];
        let context = make_context(MockResolver::new(), parameters);

        assert_eq!(context.argument::<u8>("retries"), Some(5));
        assert_eq!(context.argument::<&'static str>("name"), Some("worker"));
        assert_eq!(context.argument::<u16>("retries"), None);
        assert!(matches!(
            context.require_argument::<u8>("missing"),
            Err(ResolveError::MissingArgument { .. })
        ));
    }

    #[test]
    fn context_get_sends_child_request_to_kernel() {
        let mut kernel = MockResolver::new();
        kernel
            .expect_resolve()
            .withf(|request| {
                request.depth() == 1
                    && request.is_unique()
                    && request.is_activating(&key::of::<u64>() as &dyn Key)
                    && request.parameters().iter().all(|p| p.should_inherit())
            })
            .returning(|_| Ok(vec![Box::new(42i32) as Box<dyn Managed>]));
        let parameters: Vec<Arc<dyn Parameter>> = vec![
            Arc::new(ConstructorArgument::new("local", 1i32)),
            Arc::new(ConstructorArgument::new("shared", 2i32).inherited()),
        ];
        let context = make_context(kernel, parameters);

        assert_eq!(context.get(key::of::<i32>()).unwrap(), 42);
    }

    #[test]
    fn context_try_get_returns_none_when_nothing_matches() {
        let mut kernel = MockResolver::new();
        kernel
            .expect_resolve()
            .withf(|request| request.is_optional())
            .returning(|_| Ok(Vec::new()));
        let context = make_context(kernel, Vec::new());

        assert_eq!(context.try_get(key::of::<i32>()).unwrap(), None);
    }
}
