use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::container::resolver::{Context, ResolveError};
use crate::container::{Managed, SharedManaged};
use crate::provider::{TypedProvider, TypedSharedProvider};

/// A [`Provider`] handing out clones of one value.
///
/// [`Provider`]: crate::provider::Provider
pub struct InstanceProvider<T>
where
    T: Managed + Clone,
{
    instance: T,
}

impl<T> InstanceProvider<T>
where
    T: Managed + Clone,
{
    pub fn new(instance: T) -> Self {
        Self { instance }
    }
}

impl<T> Debug for InstanceProvider<T>
where
    T: Managed + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceProvider<T>")
            .finish_non_exhaustive()
    }
}

impl<T> TypedProvider for InstanceProvider<T>
where
    T: Managed + Clone,
{
    type Output = T;

    fn provide(&self, _context: &Context) -> Result<Self::Output, ResolveError> {
        Ok(self.instance.clone())
    }
}

impl<T> TypedSharedProvider for InstanceProvider<T> where T: SharedManaged + Clone {}

#[cfg(test)]
mod tests {
    use crate::container::resolver::MockResolver;
    use crate::key;
    use crate::provider::testing::make_context;

    use super::*;

    #[test]
    fn instance_provider_succeeds() {
        let provider = InstanceProvider::new(42);
        let context = make_context(MockResolver::new(), key::of::<i32>(), Vec::new());

        assert_eq!(provider.provide(&context).unwrap(), 42);
        assert_eq!(provider.provide(&context).unwrap(), 42);
    }
}
