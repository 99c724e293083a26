#![allow(clippy::new_without_default)]

pub mod container;
pub mod key;
pub mod module;
pub mod provider;
pub mod scope;
mod util;

pub use custom_scope_derive::component;

pub mod prelude {
    pub use crate::component;
    pub use crate::container::registry::{Configurer, RegistryError};
    pub use crate::container::resolver::{ResolveError, Resolver, TypedResolver};
    pub use crate::container::{Kernel, KernelSettings};
    pub use crate::key;
    pub use crate::module::{bind, bind_key, Configuration, Module};
    pub use crate::scope::{ResolutionRootModule, ScopeHandle};
}
