use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::resolver::Parameter;
use crate::container::Managed;
use crate::key::Key;

/// The type requested from a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Service {
    id: TypeId,
    name: &'static str,
}

impl Service {
    pub fn of<T: Managed>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for Service {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// What a request constraint can see of a binding.
#[derive(Debug)]
pub struct BindingMetadata {
    key: Box<dyn Key>,
    lifetime: &'static str,
    parameters: Vec<Arc<dyn Parameter>>,
}

impl BindingMetadata {
    pub fn new(key: Box<dyn Key>, lifetime: &'static str) -> Self {
        Self {
            key,
            lifetime,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Arc<dyn Parameter>>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn key(&self) -> &dyn Key {
        self.key.as_ref()
    }

    pub fn lifetime(&self) -> &'static str {
        self.lifetime
    }

    pub fn parameters(&self) -> &[Arc<dyn Parameter>] {
        &self.parameters
    }
}

/// A predicate selecting which bindings may satisfy a request.
pub type Constraint = Arc<dyn Fn(&BindingMetadata) -> bool + Send + Sync>;

/// Creates a [`Constraint`] accepting only the binding registered under `key`.
pub fn key_constraint<K: Key>(key: K) -> Constraint {
    Arc::new(move |binding: &BindingMetadata| binding.key() == &key as &dyn Key)
}

/// A description of what a caller wants to resolve.
///
/// Top-level requests are built by [`Resolver::create_request`]. Requests for
/// the dependencies of an object under construction are derived from their
/// parent with [`Request::create_child`], which carries over the inherited
/// parameters and records the binding being activated.
///
/// [`Resolver::create_request`]: crate::container::resolver::Resolver::create_request
#[derive(Clone)]
pub struct Request {
    service: Service,
    constraint: Option<Constraint>,
    parameters: Vec<Arc<dyn Parameter>>,
    trace: Option<Arc<ActivationTrace>>,
    is_optional: bool,
    is_unique: bool,
}

impl Request {
    pub fn new(
        service: Service,
        constraint: Option<Constraint>,
        parameters: Vec<Arc<dyn Parameter>>,
        is_optional: bool,
        is_unique: bool,
    ) -> Self {
        Self {
            service,
            constraint,
            parameters,
            trace: None,
            is_optional,
            is_unique,
        }
    }

    /// Derives a request for a dependency of the object bound to `activated`.
    pub fn create_child(
        &self,
        service: Service,
        constraint: Option<Constraint>,
        is_optional: bool,
        is_unique: bool,
        activated: &dyn Key,
    ) -> Self {
        let parameters = self
            .parameters
            .iter()
            .filter(|parameter| parameter.should_inherit())
            .cloned()
            .collect();
        let trace = ActivationTrace {
            key: activated.dyn_clone(),
            previous: self.trace.clone(),
        };

        Self {
            service,
            constraint,
            parameters,
            trace: Some(Arc::new(trace)),
            is_optional,
            is_unique,
        }
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn parameters(&self) -> &[Arc<dyn Parameter>] {
        &self.parameters
    }

    pub fn is_optional(&self) -> bool {
        self.is_optional
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Returns how many bindings are being activated above this request.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    pub fn matches(&self, binding: &BindingMetadata) -> bool {
        binding.key().target_type() == self.service.id()
            && self
                .constraint
                .as_ref()
                .map_or(true, |constraint| constraint(binding))
    }

    /// Returns true if the binding identified by `key` is already being
    /// activated somewhere above this request.
    pub fn is_activating(&self, key: &dyn Key) -> bool {
        self.ancestors().any(|ancestor| ancestor == key)
    }

    fn ancestors(&self) -> impl Iterator<Item = &dyn Key> {
        let mut next = self.trace.as_deref();
        std::iter::from_fn(move || {
            let current = next?;
            next = current.previous.as_deref();
            Some(current.key.as_ref())
        })
    }
}

impl Debug for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Request")
            .field("service", &self.service)
            .field("constrained", &self.constraint.is_some())
            .field("parameters", &self.parameters)
            .field("depth", &self.depth())
            .field("is_optional", &self.is_optional)
            .field("is_unique", &self.is_unique)
            .finish()
    }
}

struct ActivationTrace {
    key: Box<dyn Key>,
    previous: Option<Arc<ActivationTrace>>,
}

#[cfg(test)]
mod tests {
    use crate::container::resolver::ConstructorArgument;
    use crate::key;

    use super::*;

    #[test]
    fn request_create_child_inherits_only_inherited_parameters() {
        let parameters: Vec<Arc<dyn Parameter>> = vec![
            Arc::new(ConstructorArgument::new("local", 1i32)),
            Arc::new(ConstructorArgument::new("shared", 2i32).inherited()),
        ];
        let request = Request::new(Service::of::<i64>(), None, parameters, false, true);
        let child = request.create_child(
            Service::of::<i32>(),
            None,
            false,
            true,
            &key::of::<i64>(),
        );

        assert_eq!(request.parameters().len(), 2);
        assert_eq!(child.parameters().len(), 1);
        assert_eq!(child.parameters()[0].name(), "shared");
        assert_eq!(child.service(), Service::of::<i32>());
    }

    #[test]
    fn request_depth_and_activation_trace_succeed() {
        let root = Request::new(Service::of::<i64>(), None, Vec::new(), false, true);
        let child = root.create_child(Service::of::<i32>(), None, false, true, &key::of::<i64>());
        let grandchild =
            child.create_child(Service::of::<u8>(), None, false, true, &key::named::<i32>("a"));

        assert_eq!(root.depth(), 0);
        assert_eq!(child.depth(), 1);
        assert_eq!(grandchild.depth(), 2);
        assert!(grandchild.is_activating(&key::of::<i64>()));
        assert!(grandchild.is_activating(&key::named::<i32>("a")));
        assert!(!grandchild.is_activating(&key::of::<i32>()));
        assert!(!root.is_activating(&key::of::<i64>()));
    }

    #[test]
    fn request_matches_filters_by_service_and_constraint() {
        let first = BindingMetadata::new(Box::new(key::named::<i32>("first")), "Transient");
        let second = BindingMetadata::new(Box::new(key::named::<i32>("second")), "Transient");
        let other = BindingMetadata::new(Box::new(key::of::<i64>()), "Transient");

        let unconstrained = Request::new(Service::of::<i32>(), None, Vec::new(), false, false);
        assert!(unconstrained.matches(&first));
        assert!(unconstrained.matches(&second));
        assert!(!unconstrained.matches(&other));

        let constrained = Request::new(
            Service::of::<i32>(),
            Some(key_constraint(key::named::<i32>("second"))),
            Vec::new(),
            false,
            true,
        );
        assert!(!constrained.matches(&first));
        assert!(constrained.matches(&second));
    }
}
