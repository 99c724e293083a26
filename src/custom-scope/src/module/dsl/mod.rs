//! A fluent way to declare bindings inside [`Module::configure`].
//!
//! ```rust
//! # use std::convert::Infallible;
//! # use std::error::Error;
//! # use std::sync::Arc;
//! # use custom_scope::prelude::*;
//! struct Settings {
//!     url: &'static str,
//! }
//!
//! struct AppModule;
//!
//! impl Module for AppModule {
//!     fn configure(
//!         &self,
//!         configurer: &mut dyn Configurer,
//!     ) -> Result<(), Box<dyn Error + Send + Sync>> {
//!         bind::<Arc<Settings>>()
//!             .to_instance(Arc::new(Settings { url: "localhost" }))
//!             .in_singleton_scope()
//!             .set_on(configurer);
//!         bind::<String>()
//!             .qualified_by("url")
//!             .to_closure(|settings: Arc<Settings>| {
//!                 Ok::<_, Infallible>(settings.url.to_owned())
//!             })
//!             .set_on(configurer);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [`Module::configure`]: crate::module::Module::configure

pub mod metadata_helper;
pub mod provider_helper;

use metadata_helper::MetadataBinding;

use crate::container::Managed;
use crate::key::TypedKey;
use crate::scope::{Scoped, Transient};

/// The lifetime a binding is declared with: [`Transient`] or [`Scoped`].
#[allow(private_bounds)]
pub trait ToLifetime: Sealed {}

impl ToLifetime for Scoped {}

impl ToLifetime for Transient {}

trait Sealed {}

impl Sealed for Scoped {}

impl Sealed for Transient {}

/// Starts declaring a transient binding of `KT` without a qualifier.
pub fn bind<KT>() -> MetadataBinding<KT, (), Transient>
where
    KT: Managed,
{
    MetadataBinding::new((), Transient)
}

/// Starts declaring a transient binding under `key`.
pub fn bind_key<K>(key: K) -> MetadataBinding<K::Target, K::Qualifier, Transient>
where
    K: TypedKey,
{
    MetadataBinding::new(key.qualifier(), Transient)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::error::Error;
    use std::sync::Arc;

    use crate::container::registry::{Configurer, ConfigurerImpl};
    use crate::container::resolver::{Context, ResolveError};
    use crate::key::{self, Key};
    use crate::module::Module;
    use crate::provider::component::Component;
    use crate::provider::instance::InstanceProvider;
    use crate::scope;

    use super::*;

    struct DslCompilationTest;

    impl Module for DslCompilationTest {
        fn configure(
            &self,
            configurer: &mut dyn Configurer,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            bind::<TestObject>()
                .qualified_by(1)
                .as_transient()
                .set_on(configurer);

            bind::<Arc<TestSharedObject>>()
                .in_custom_scope()
                .set_on(configurer);

            bind::<Arc<dyn TestTrait>>()
                .qualified_by("qualifier")
                .in_singleton_scope()
                .to_component::<TestDynObject>()
                .set_on(configurer);

            bind::<i64>()
                .to_closure(|| Ok::<_, Infallible>(42))
                .qualified_by("i64")
                .set_on(configurer);

            bind::<u16>()
                .with_argument("port", 8080u16)
                .to_raw_closure(
                    |context: &Context| -> Result<Result<u16, Infallible>, ResolveError> {
                        Ok(Ok(context.require_argument("port")?))
                    },
                )
                .set_on(configurer);

            bind::<usize>()
                .to_method(|context: &Context| context.request().depth())
                .set_on(configurer);

            bind::<Arc<i32>>()
                .to_instance(Arc::new(42))
                .in_scope("Thread", scope::singleton())
                .set_on(configurer);

            bind_key(key::named::<&'static str>("str"))
                .to_provider(InstanceProvider::new("str"))
                .set_on(configurer);

            Ok(())
        }
    }

    trait TestTrait: Send + Sync + 'static {}

    struct TestDynObject;

    impl TestTrait for TestDynObject {}

    impl Component for TestDynObject {
        type Constructed = Arc<dyn TestTrait>;

        type Error = Infallible;

        fn construct(_context: &Context) -> Result<Result<Self, Self::Error>, ResolveError> {
            Ok(Ok(Self))
        }

        fn post_process(self) -> Self::Constructed {
            Arc::new(self)
        }
    }

    struct TestSharedObject;

    impl Component for TestSharedObject {
        type Constructed = Arc<Self>;

        type Error = Infallible;

        fn construct(_context: &Context) -> Result<Result<Self, Self::Error>, ResolveError> {
            Ok(Ok(Self))
        }

        fn post_process(self) -> Self::Constructed {
            Arc::new(self)
        }
    }

    struct TestObject;

    impl Component for TestObject {
        type Constructed = Self;

        type Error = Infallible;

        fn construct(_context: &Context) -> Result<Result<Self, Self::Error>, ResolveError> {
            Ok(Ok(Self))
        }

        fn post_process(self) -> Self::Constructed {
            Self
        }
    }

    #[test]
    fn dsl_declares_bindings_with_lifetimes_and_parameters() {
        let mut configurer = ConfigurerImpl::new();
        DslCompilationTest.setup(&mut configurer);
        let bindings = configurer.finish().unwrap();

        assert_eq!(bindings.len(), 8);

        let lifetime_of = |key: &dyn Key| bindings.get(key).unwrap().metadata().lifetime();
        assert_eq!(lifetime_of(&key::qualified::<TestObject, _>(1)), "Transient");
        assert_eq!(lifetime_of(&key::of::<Arc<TestSharedObject>>()), "Custom");
        assert_eq!(
            lifetime_of(&key::named::<Arc<dyn TestTrait>>("qualifier")),
            "Singleton"
        );
        assert_eq!(lifetime_of(&key::named::<i64>("i64")), "Transient");
        assert_eq!(lifetime_of(&key::of::<Arc<i32>>()), "Thread");

        let port = bindings.get(&key::of::<u16>()).unwrap();
        assert_eq!(port.metadata().parameters().len(), 1);
        assert_eq!(port.metadata().parameters()[0].name(), "port");
    }
}
