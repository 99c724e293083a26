use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::registry::{Configurer, TypedConfigurer};
use crate::container::resolver::{ConstructorArgument, Context, Parameter};
use crate::container::Managed;
use crate::key::{self, TypedQualifier};
use crate::module::dsl::provider_helper::ProviderBinding;
use crate::module::dsl::ToLifetime;
use crate::provider::closure::{Closure, ClosureProvider, RawClosure, RawClosureProvider};
use crate::provider::component::{Component, ComponentProvider};
use crate::provider::instance::InstanceProvider;
use crate::provider::method::MethodProvider;
use crate::provider::TypedProvider;
use crate::scope::{ScopeCallback, Scoped, Transient};

/// A binding whose key and lifetime are being declared, before a provider is
/// chosen.
///
/// Calling `set_on` directly binds the type to itself as a [`Component`].
#[allow(private_bounds)]
pub struct MetadataBinding<KT, KQ, L>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
{
    qualifier: KQ,
    lifetime: L,
    parameters: Vec<Arc<dyn Parameter>>,
    _marker: PhantomData<fn() -> KT>,
}

#[allow(private_bounds)]
impl<KT, KQ, L> MetadataBinding<KT, KQ, L>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
{
    pub(super) fn new(qualifier: KQ, lifetime: L) -> Self {
        Self::with_parameters(qualifier, lifetime, Vec::new())
    }

    fn with_parameters(qualifier: KQ, lifetime: L, parameters: Vec<Arc<dyn Parameter>>) -> Self {
        Self {
            qualifier,
            lifetime,
            parameters,
            _marker: PhantomData,
        }
    }

    pub fn qualified_by<NewKQ>(self, qualifier: NewKQ) -> MetadataBinding<KT, NewKQ, L>
    where
        NewKQ: TypedQualifier,
    {
        MetadataBinding::with_parameters(qualifier, self.lifetime, self.parameters)
    }

    pub fn as_transient(self) -> MetadataBinding<KT, KQ, Transient> {
        MetadataBinding::with_parameters(self.qualifier, Transient, self.parameters)
    }

    pub fn in_singleton_scope(self) -> MetadataBinding<KT, KQ, Scoped> {
        MetadataBinding::with_parameters(self.qualifier, Scoped::singleton(), self.parameters)
    }

    /// Caches objects per [`ScopeHandle`] the request was issued through.
    ///
    /// [`ScopeHandle`]: crate::scope::ScopeHandle
    pub fn in_custom_scope(self) -> MetadataBinding<KT, KQ, Scoped> {
        MetadataBinding::with_parameters(self.qualifier, Scoped::custom(), self.parameters)
    }

    /// Caches objects under the key returned by `callback`. `label` is the
    /// lifetime reported in the binding's metadata.
    pub fn in_scope(
        self,
        label: &'static str,
        callback: ScopeCallback,
    ) -> MetadataBinding<KT, KQ, Scoped> {
        let scope = Scoped::new(label, callback);
        MetadataBinding::with_parameters(self.qualifier, scope, self.parameters)
    }

    /// Attaches a [`ConstructorArgument`] to the binding.
    pub fn with_argument<T>(mut self, name: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Managed + Clone,
    {
        self.parameters
            .push(Arc::new(ConstructorArgument::new(name, value)));
        self
    }

    pub fn to_component<C>(self) -> ProviderBinding<KT, KQ, L, ComponentProvider<C>>
    where
        C: Component<Constructed = KT>,
    {
        self.to_provider(ComponentProvider::new())
    }

    pub fn to_closure<C, D>(
        self,
        closure: C,
    ) -> ProviderBinding<KT, KQ, L, ClosureProvider<KT, C, D>>
    where
        C: Closure<D, Constructed = KT>,
        D: Send + Sync + 'static,
    {
        self.to_provider(ClosureProvider::new(closure))
    }

    pub fn to_raw_closure<C>(
        self,
        closure: C,
    ) -> ProviderBinding<KT, KQ, L, RawClosureProvider<KT, C>>
    where
        C: RawClosure<Constructed = KT>,
    {
        self.to_provider(RawClosureProvider::new(closure))
    }

    pub fn to_method<F>(self, method: F) -> ProviderBinding<KT, KQ, L, MethodProvider<KT, F>>
    where
        F: Fn(&Context) -> KT + Send + Sync + 'static,
    {
        self.to_provider(MethodProvider::new(method))
    }

    pub fn to_instance(self, instance: KT) -> ProviderBinding<KT, KQ, L, InstanceProvider<KT>>
    where
        KT: Clone,
    {
        self.to_provider(InstanceProvider::new(instance))
    }

    pub fn to_provider<P>(self, provider: P) -> ProviderBinding<KT, KQ, L, P>
    where
        P: TypedProvider<Output = KT>,
    {
        ProviderBinding::new(provider, self.qualifier, self.lifetime, self.parameters)
    }
}

impl<C, KQ> MetadataBinding<Arc<C>, KQ, Scoped>
where
    C: Component<Constructed = Arc<C>>,
    KQ: TypedQualifier,
{
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<Arc<C>, _>(self.qualifier);
        let provider = ComponentProvider::<C>::new();
        configurer.register_shared_with(key, provider, self.lifetime, self.parameters);
    }
}

impl<KT, KQ> MetadataBinding<KT, KQ, Transient>
where
    KT: Component<Constructed = KT>,
    KQ: TypedQualifier,
{
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<KT, _>(self.qualifier);
        let provider = ComponentProvider::<KT>::new();
        configurer.register_with(key, provider, self.parameters);
    }
}
