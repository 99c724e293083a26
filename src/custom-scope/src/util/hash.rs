use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Equality and hashing for values only known through a trait object.
pub trait DynHash: Any {
    fn dyn_eq(&self, other: &dyn Any) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: Eq + Hash + 'static> DynHash for T {
    fn dyn_eq(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use std::hash::DefaultHasher;

    use super::*;

    #[derive(PartialEq, Eq, Hash)]
    struct Meters(u32);

    #[derive(PartialEq, Eq, Hash)]
    struct Seconds(u32);

    #[test]
    fn dyn_eq_distinguishes_types_with_equal_payloads() {
        assert!(Meters(3).dyn_eq(&Meters(3)));
        assert!(!Meters(3).dyn_eq(&Meters(4)));
        assert!(!Meters(3).dyn_eq(&Seconds(3)));
    }

    #[test]
    fn dyn_hash_includes_the_concrete_type() {
        assert_eq!(hash_of(&Meters(3)), hash_of(&Meters(3)));
        assert_ne!(hash_of(&Meters(3)), hash_of(&Seconds(3)));
    }

    fn hash_of(value: &dyn DynHash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.dyn_hash(&mut hasher);
        hasher.finish()
    }
}
