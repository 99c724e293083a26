use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::mem;
use std::slice;
use std::sync::Arc;

use crate::container::resolver::BindingMetadata;
use crate::key::Key;
use crate::provider::{Provider, SharedProvider};
use crate::scope::ScopeCallback;

/// All bindings of a kernel, grouped by the type they produce.
///
/// Bindings of one type are kept in registration order.
#[derive(Debug, Default)]
pub struct BindingMap {
    bindings: HashMap<TypeId, BindingSlot>,
}

impl BindingMap {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Inserts `entry`, replacing and returning the binding registered with
    /// the same key if there is one.
    pub fn insert(&mut self, entry: BindingEntry) -> Option<BindingEntry> {
        let target = entry.key().target_type();
        if let Some(slot) = self.bindings.get_mut(&target) {
            slot.insert(entry)
        } else {
            self.bindings.insert(target, entry.into());
            None
        }
    }

    pub fn get(&self, key: &dyn Key) -> Option<&BindingEntry> {
        self.bindings
            .get(&key.target_type())
            .and_then(|slot| slot.get(key))
    }

    /// Returns every binding producing objects of type `target`.
    pub fn bindings_of(&self, target: TypeId) -> &[BindingEntry] {
        self.bindings
            .get(&target)
            .map(BindingSlot::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bindings.values().map(|slot| slot.as_slice().len()).sum()
    }
}

#[derive(Debug)]
enum BindingSlot {
    Single(BindingEntry),
    Multiple(Vec<BindingEntry>),
}

impl BindingSlot {
    fn insert(&mut self, entry: BindingEntry) -> Option<BindingEntry> {
        match self {
            Self::Single(existing) if existing.key() == entry.key() => {
                Some(mem::replace(existing, entry))
            }
            Self::Single(_) => {
                let Self::Single(existing) = mem::replace(self, Self::Multiple(Vec::with_capacity(2)))
                else {
                    unreachable!("`self` should match `Self::Single(_)`")
                };
                let Self::Multiple(entries) = self else {
                    unreachable!("`self` should already be assigned to `Self::Multiple(_)`")
                };
                entries.push(existing);
                entries.push(entry);
                None
            }
            Self::Multiple(entries) => {
                if let Some(existing) = entries.iter_mut().find(|e| e.key() == entry.key()) {
                    Some(mem::replace(existing, entry))
                } else {
                    entries.push(entry);
                    None
                }
            }
        }
    }

    fn get(&self, key: &dyn Key) -> Option<&BindingEntry> {
        self.as_slice().iter().find(|entry| entry.key() == key)
    }

    fn as_slice(&self) -> &[BindingEntry] {
        match self {
            Self::Single(entry) => slice::from_ref(entry),
            Self::Multiple(entries) => entries,
        }
    }
}

impl From<BindingEntry> for BindingSlot {
    fn from(entry: BindingEntry) -> Self {
        Self::Single(entry)
    }
}

/// A registered binding: its metadata, its provider and, for shared
/// bindings, the callback choosing the scope objects are cached under.
pub struct BindingEntry {
    metadata: Arc<BindingMetadata>,
    kind: BindingKind,
}

pub enum BindingKind {
    Shared {
        provider: Box<dyn SharedProvider>,
        scope: ScopeCallback,
    },
    Owned {
        provider: Box<dyn Provider>,
    },
}

impl BindingEntry {
    pub fn new_shared(
        metadata: BindingMetadata,
        provider: Box<dyn SharedProvider>,
        scope: ScopeCallback,
    ) -> Self {
        Self {
            metadata: Arc::new(metadata),
            kind: BindingKind::Shared { provider, scope },
        }
    }

    pub fn new_owned(metadata: BindingMetadata, provider: Box<dyn Provider>) -> Self {
        Self {
            metadata: Arc::new(metadata),
            kind: BindingKind::Owned { provider },
        }
    }

    pub fn key(&self) -> &dyn Key {
        self.metadata.key()
    }

    pub fn metadata(&self) -> &Arc<BindingMetadata> {
        &self.metadata
    }

    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }
}

impl Debug for BindingEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let provider: &dyn Debug = match &self.kind {
            BindingKind::Shared { provider, .. } => provider,
            BindingKind::Owned { provider } => provider,
        };
        f.debug_struct("BindingEntry")
            .field("metadata", &self.metadata)
            .field("provider", provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::key;
    use crate::provider::instance::InstanceProvider;
    use crate::scope;

    use super::*;

    fn owned<K: Key>(key: K, value: i32) -> BindingEntry {
        BindingEntry::new_owned(
            BindingMetadata::new(Box::new(key), "Transient"),
            Box::new(InstanceProvider::new(value)),
        )
    }

    #[test]
    fn binding_map_insert_replaces_same_key() {
        let mut map = BindingMap::new();
        assert!(map.insert(owned(key::of::<i32>(), 1)).is_none());
        assert!(map.insert(owned(key::named::<i32>("a"), 2)).is_none());
        assert!(map.insert(owned(key::named::<i32>("b"), 3)).is_none());
        assert!(map.insert(owned(key::named::<i32>("a"), 4)).is_some());
        assert!(map.insert(owned(key::of::<i32>(), 5)).is_some());

        assert_eq!(map.len(), 3);
        assert!(map.get(&key::named::<i32>("b")).is_some());
        assert!(map.get(&key::named::<i32>("c")).is_none());
    }

    #[test]
    fn binding_map_bindings_of_keeps_registration_order() {
        let mut map = BindingMap::new();
        map.insert(owned(key::named::<i32>("first"), 1));
        map.insert(owned(key::named::<i32>("second"), 2));
        map.insert(BindingEntry::new_shared(
            BindingMetadata::new(Box::new(key::of::<Arc<u8>>()), "Singleton"),
            Box::new(InstanceProvider::new(Arc::new(0u8))),
            scope::singleton(),
        ));

        let bindings = map.bindings_of(TypeId::of::<i32>());
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].key(), &key::named::<i32>("first") as &dyn Key);
        assert_eq!(bindings[1].key(), &key::named::<i32>("second") as &dyn Key);

        let shared = map.bindings_of(TypeId::of::<Arc<u8>>());
        assert!(matches!(shared[0].kind(), BindingKind::Shared { .. }));
        assert!(map.bindings_of(TypeId::of::<i64>()).is_empty());
    }
}
