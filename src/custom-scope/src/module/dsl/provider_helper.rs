use std::sync::Arc;

use crate::container::registry::{Configurer, TypedConfigurer};
use crate::container::resolver::Parameter;
use crate::container::{Managed, SharedManaged};
use crate::key::{self, TypedQualifier};
use crate::module::dsl::ToLifetime;
use crate::provider::{TypedProvider, TypedSharedProvider};
use crate::scope::{ScopeCallback, Scoped, Transient};

/// A binding whose provider is chosen. `set_on` registers it.
#[allow(private_bounds)]
pub struct ProviderBinding<KT, KQ, L, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
    P: TypedProvider<Output = KT>,
{
    provider: P,
    qualifier: KQ,
    lifetime: L,
    parameters: Vec<Arc<dyn Parameter>>,
}

#[allow(private_bounds)]
impl<KT, KQ, L, P> ProviderBinding<KT, KQ, L, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    L: ToLifetime,
    P: TypedProvider<Output = KT>,
{
    pub(super) fn new(
        provider: P,
        qualifier: KQ,
        lifetime: L,
        parameters: Vec<Arc<dyn Parameter>>,
    ) -> Self {
        Self {
            provider,
            qualifier,
            lifetime,
            parameters,
        }
    }

    pub fn qualified_by<NewKQ>(self, qualifier: NewKQ) -> ProviderBinding<KT, NewKQ, L, P>
    where
        NewKQ: TypedQualifier,
    {
        ProviderBinding::new(self.provider, qualifier, self.lifetime, self.parameters)
    }

    pub fn as_transient(self) -> ProviderBinding<KT, KQ, Transient, P> {
        self.with_lifetime(Transient)
    }

    pub fn in_singleton_scope(self) -> ProviderBinding<KT, KQ, Scoped, P> {
        self.with_lifetime(Scoped::singleton())
    }

    pub fn in_custom_scope(self) -> ProviderBinding<KT, KQ, Scoped, P> {
        self.with_lifetime(Scoped::custom())
    }

    pub fn in_scope(
        self,
        label: &'static str,
        callback: ScopeCallback,
    ) -> ProviderBinding<KT, KQ, Scoped, P> {
        self.with_lifetime(Scoped::new(label, callback))
    }

    fn with_lifetime<NewL>(self, lifetime: NewL) -> ProviderBinding<KT, KQ, NewL, P>
    where
        NewL: ToLifetime,
    {
        ProviderBinding::new(self.provider, self.qualifier, lifetime, self.parameters)
    }
}

impl<KT, KQ, P> ProviderBinding<KT, KQ, Scoped, P>
where
    KT: SharedManaged,
    KQ: TypedQualifier,
    P: TypedSharedProvider<Output = KT>,
{
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<KT, _>(self.qualifier);
        configurer.register_shared_with(key, self.provider, self.lifetime, self.parameters);
    }
}

impl<KT, KQ, P> ProviderBinding<KT, KQ, Transient, P>
where
    KT: Managed,
    KQ: TypedQualifier,
    P: TypedProvider<Output = KT>,
{
    pub fn set_on(self, configurer: &mut dyn Configurer) {
        let key = key::qualified::<KT, _>(self.qualifier);
        configurer.register_with(key, self.provider, self.parameters);
    }
}
