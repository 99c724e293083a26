mod handle;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Weak};

use crate::container::resolver::Context;

pub use handle::{resolution_root_from_context, ResolutionRootModule, ScopeHandle};

/// The object a shared binding's instances are cached under.
///
/// A [`ScopeKey`] can be created from any [`Arc`] and compares by the address
/// of the allocation, so two keys are equal only if they were created from
/// clones of the same [`Arc`]. The key keeps its owner alive, so it should
/// only be held while an object is being looked up or constructed. The cache
/// itself only keeps a [`WeakScopeKey`].
pub struct ScopeKey {
    address: usize,
    owner: Box<dyn Owner>,
}

impl ScopeKey {
    pub fn new<T>(owner: Arc<T>) -> Self
    where
        T: Send + Sync + ?Sized + 'static,
    {
        Self {
            address: address_of(&owner),
            owner: Box::new(owner),
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn downgrade(&self) -> WeakScopeKey {
        WeakScopeKey {
            address: self.address,
            owner: self.owner.downgrade(),
        }
    }
}

impl Clone for ScopeKey {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            owner: self.owner.dyn_clone(),
        }
    }
}

impl PartialEq for ScopeKey {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for ScopeKey {}

impl Debug for ScopeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("ScopeKey")
            .field(&format_args!("{:#x}", self.address))
            .finish()
    }
}

/// The non-owning form of a [`ScopeKey`].
///
/// While a [`WeakScopeKey`] exists the allocation of its owner is not freed,
/// even after the owner itself has been dropped, so no other owner can show
/// up at the same address in the meantime.
pub struct WeakScopeKey {
    address: usize,
    owner: Box<dyn WeakOwner>,
}

impl WeakScopeKey {
    pub fn address(&self) -> usize {
        self.address
    }

    pub fn is_alive(&self) -> bool {
        self.owner.is_alive()
    }

    /// Returns true if `key` was created from the owner of `self`.
    pub fn is_owned_by(&self, key: &ScopeKey) -> bool {
        self.address == key.address && self.is_alive()
    }
}

impl Debug for WeakScopeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("WeakScopeKey")
            .field("address", &format_args!("{:#x}", self.address))
            .field("alive", &self.is_alive())
            .finish()
    }
}

trait Owner: Send + Sync {
    fn downgrade(&self) -> Box<dyn WeakOwner>;

    fn dyn_clone(&self) -> Box<dyn Owner>;
}

impl<T> Owner for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn downgrade(&self) -> Box<dyn WeakOwner> {
        Box::new(Arc::downgrade(self))
    }

    fn dyn_clone(&self) -> Box<dyn Owner> {
        Box::new(Arc::clone(self))
    }
}

trait WeakOwner: Send + Sync {
    fn is_alive(&self) -> bool;
}

impl<T> WeakOwner for Weak<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }
}

fn address_of<T: ?Sized>(owner: &Arc<T>) -> usize {
    Arc::as_ptr(owner).cast::<()>() as usize
}

/// Decides which [`ScopeKey`] the object of a shared binding is cached under
/// for a given activation. Returning [`None`] makes the binding behave as a
/// transient one for that activation.
pub type ScopeCallback = Arc<dyn Fn(&Context) -> Option<ScopeKey> + Send + Sync>;

/// Caches one object for the whole kernel.
pub fn singleton() -> ScopeCallback {
    Arc::new(|context: &Context| Some(ScopeKey::new(Arc::clone(context.kernel()))))
}

/// Caches one object per [`ScopeHandle`] which issued the request, and one
/// object for the kernel when the request comes from no scope at all.
pub fn custom() -> ScopeCallback {
    Arc::new(|context: &Context| Some(ScopeKey::new(resolution_root_from_context(context))))
}

/// The lifetime of objects constructed anew for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transient;

/// The lifetime of objects cached under the key chosen by a [`ScopeCallback`].
#[derive(Clone)]
pub struct Scoped {
    label: &'static str,
    callback: ScopeCallback,
}

impl Scoped {
    pub fn new(label: &'static str, callback: ScopeCallback) -> Self {
        Self { label, callback }
    }

    pub fn singleton() -> Self {
        Self::new("Singleton", singleton())
    }

    pub fn custom() -> Self {
        Self::new("Custom", custom())
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn callback(&self) -> &ScopeCallback {
        &self.callback
    }

    pub fn into_callback(self) -> ScopeCallback {
        self.callback
    }
}

impl Debug for Scoped {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Scoped")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
