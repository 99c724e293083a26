use std::borrow::Cow;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::Managed;
use crate::util::any::AsAny;

/// Additional data attached to a request or to a binding.
///
/// Parameters travel with a [`Request`] and are visible to the providers
/// activated for it through the [`Context`]. An inherited parameter is also
/// copied onto every child request issued while resolving the dependencies
/// of the requested object.
///
/// [`Request`]: crate::container::resolver::Request
/// [`Context`]: crate::container::resolver::Context
pub trait Parameter: AsAny + Debug + Send + Sync {
    fn name(&self) -> &str;

    fn should_inherit(&self) -> bool;
}

impl dyn Parameter {
    pub fn is<T: Parameter>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Parameter>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A named value handed to the provider of an object, readable through
/// [`Context::argument`].
///
/// [`Context::argument`]: crate::container::resolver::Context::argument
pub struct ConstructorArgument<T>
where
    T: Managed + Clone,
{
    name: Cow<'static, str>,
    value: T,
    inherited: bool,
}

impl<T> ConstructorArgument<T>
where
    T: Managed + Clone,
{
    pub fn new(name: impl Into<Cow<'static, str>>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            inherited: false,
        }
    }

    /// Makes the argument visible to the providers of all dependencies too.
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Debug for ConstructorArgument<T>
where
    T: Managed + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConstructorArgument<T>")
            .field("name", &self.name)
            .field("inherited", &self.inherited)
            .finish_non_exhaustive()
    }
}

impl<T> Parameter for ConstructorArgument<T>
where
    T: Managed + Clone,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn should_inherit(&self) -> bool {
        self.inherited
    }
}
