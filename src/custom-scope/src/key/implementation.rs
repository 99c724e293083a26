use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::container::Managed;
use crate::key::{Key, TypedKey, TypedQualifier};

pub struct KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    qualifier: Q,
    _marker: PhantomData<fn() -> T>,
}

impl<T, Q> KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    pub fn new(qualifier: Q) -> Self {
        Self {
            qualifier,
            _marker: PhantomData,
        }
    }
}

impl<T, Q> Clone for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Q> Copy for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
}

impl<T, Q> Debug for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl<T, Q> Display for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if TypeId::of::<Q>() == TypeId::of::<()>() {
            write!(f, "{}", any::type_name::<T>())
        } else {
            write!(f, "{}@{:?}", any::type_name::<T>(), self.qualifier)
        }
    }
}

impl<T, Q> PartialEq for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn eq(&self, other: &Self) -> bool {
        self.qualifier.eq(&other.qualifier)
    }
}

impl<T, Q> Eq for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
}

impl<T, Q> Hash for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualifier.hash(state);
    }
}

impl<T, Q> Key for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn target_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn qualifier_type(&self) -> TypeId {
        TypeId::of::<Q>()
    }

    fn dyn_clone(&self) -> Box<dyn Key> {
        Box::new(*self)
    }
}

impl<T, Q> TypedKey for KeyImpl<T, Q>
where
    T: Managed,
    Q: TypedQualifier,
{
    type Target = T;

    type Qualifier = Q;

    fn qualifier(&self) -> Self::Qualifier {
        self.qualifier
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn key_impl_target_succeeds() {
        let plain: Box<dyn Key> = Box::new(KeyImpl::<Arc<i32>, _>::new(()));
        let named: Box<dyn Key> = Box::new(KeyImpl::<Arc<i32>, _>::new("name"));

        assert_eq!(plain.target_type(), TypeId::of::<Arc<i32>>());
        assert_eq!(named.target_type(), TypeId::of::<Arc<i32>>());
        assert_eq!(plain.qualifier_type(), TypeId::of::<()>());
        assert_eq!(named.qualifier_type(), TypeId::of::<&'static str>());
    }

    #[test]
    fn key_impl_eq_compares_target_and_qualifier() {
        let plain: Box<dyn Key> = Box::new(KeyImpl::<i32, _>::new(()));
        let name1: Box<dyn Key> = Box::new(KeyImpl::<i32, _>::new("name1"));
        let name1_again: Box<dyn Key> = Box::new(KeyImpl::<i32, _>::new("name1"));
        let other_target: Box<dyn Key> = Box::new(KeyImpl::<i64, _>::new("name1"));

        assert_ne!(&plain, &name1);
        assert_eq!(&name1, &name1_again);
        assert_ne!(&name1, &other_target);

        let set: HashSet<Box<dyn Key>> = [plain, name1, name1_again, other_target]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn key_impl_display_hides_unit_qualifier() {
        assert_eq!(KeyImpl::<i32, _>::new(()).to_string(), "i32");
        assert_eq!(KeyImpl::<i32, _>::new("a").to_string(), "i32@\"a\"");
    }
}
