use std::collections::HashMap;
use std::mem;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::container::resolver::ResolveError;
use crate::container::{Managed, SharedManaged};
use crate::key::Key;
use crate::scope::{ScopeKey, WeakScopeKey};

/// Objects of shared bindings, grouped by the scope they are cached under.
///
/// Scopes are only referenced weakly. Once a scope is dropped, its objects
/// stay in the cache until the next call to [`ScopeCache::prune`].
pub(super) struct ScopeCache {
    slots: RwLock<HashMap<usize, ScopeSlot>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the object cached for `key` under `scope`, calling `construct`
    /// to create it if there is none yet.
    ///
    /// Concurrent calls for the same `scope` and `key` construct the object
    /// only once: the other callers wait for the result of the first one.
    /// A call made by the thread which is already constructing the object
    /// fails with [`ResolveError::CyclicDependency`].
    pub fn get_or_create<F>(
        &self,
        scope: &ScopeKey,
        key: &dyn Key,
        construct: F,
    ) -> Result<Box<dyn Managed>, ResolveError>
    where
        F: FnOnce() -> Result<Box<dyn SharedManaged>, ResolveError>,
    {
        if let Some(object) = self.try_get_constructed_object(scope, key) {
            return Ok(object);
        }

        let mut slots = self.slots.write();
        let slot = Self::slot_mut(&mut slots, scope);

        if let Some(object) = slot.objects.get(key) {
            Ok(object.dyn_clone().upcast_managed())
        } else if let Some(context) = slot.constructing.get_mut(key) {
            if context.is_constructed_by_current_thread() {
                Err(self.stop_construction_on_cyclic_dependency(slots, scope, key))
            } else {
                let (sender, receiver) = oneshot::channel();
                context.register_waiter(sender);
                drop(slots);
                self.get_object_on_response(receiver, key)
            }
        } else {
            self.construct_shared_object(slots, scope, key, construct)
        }
    }

    /// Releases the objects of every scope which has been dropped, returning
    /// the number of released scopes.
    pub fn prune(&self) -> usize {
        let mut slots = self.slots.write();
        let (alive, dead): (HashMap<_, _>, HashMap<_, _>) = mem::take(&mut *slots)
            .into_iter()
            .partition(|(_, slot)| slot.owner.is_alive());
        *slots = alive;
        drop(slots);

        let count = dead.len();
        if count > 0 {
            let objects: usize = dead.values().map(|slot| slot.objects.len()).sum();
            debug!(scopes = count, objects, "pruning dropped scopes");
        }
        // Objects may hold the last references to other scopes, so they are
        // dropped without the lock.
        drop(dead);
        count
    }

    /// Returns the number of scopes with a slot in the cache, dropped or not.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    fn try_get_constructed_object(
        &self,
        scope: &ScopeKey,
        key: &dyn Key,
    ) -> Option<Box<dyn Managed>> {
        let slots = self.slots.read();
        slots
            .get(&scope.address())
            .and_then(|slot| slot.objects.get(key))
            .map(|object| object.dyn_clone().upcast_managed())
    }

    fn slot_mut<'a>(
        slots: &'a mut HashMap<usize, ScopeSlot>,
        scope: &ScopeKey,
    ) -> &'a mut ScopeSlot {
        let slot = slots
            .entry(scope.address())
            .or_insert_with(|| ScopeSlot::new(scope.downgrade()));
        if !slot.owner.is_owned_by(scope) {
            // A dead slot at the address of a live scope is stale.
            *slot = ScopeSlot::new(scope.downgrade());
        }
        slot
    }

    fn stop_construction_on_cyclic_dependency(
        &self,
        slots: RwLockWriteGuard<HashMap<usize, ScopeSlot>>,
        scope: &ScopeKey,
        key: &dyn Key,
    ) -> ResolveError {
        let err = ResolveError::CyclicDependency {
            key: key.dyn_clone(),
        };
        self.notify_waiters(slots, scope, key, WaitResponse::Error(err.clone()));
        err
    }

    fn get_object_on_response(
        &self,
        receiver: Receiver<WaitResponse>,
        key: &dyn Key,
    ) -> Result<Box<dyn Managed>, ResolveError> {
        match receiver.recv() {
            Ok(WaitResponse::Constructed(object)) => Ok(object.upcast_managed()),
            Ok(WaitResponse::Error(err)) => Err(err),
            Err(_) => Err(ResolveError::ConstructionAborted {
                key: key.dyn_clone(),
            }),
        }
    }

    fn construct_shared_object<F>(
        &self,
        mut slots: RwLockWriteGuard<HashMap<usize, ScopeSlot>>,
        scope: &ScopeKey,
        key: &dyn Key,
        construct: F,
    ) -> Result<Box<dyn Managed>, ResolveError>
    where
        F: FnOnce() -> Result<Box<dyn SharedManaged>, ResolveError>,
    {
        let on_thread = thread::current().id();
        let slot = Self::slot_mut(&mut slots, scope);
        slot.constructing
            .insert(key.dyn_clone(), ConstructingObjectContext::new(on_thread));
        drop(slots);

        debug!(%key, ?scope, "constructing shared object");
        let guard = ConstructionGuard {
            cache: self,
            scope,
            key,
        };
        let res = construct();
        guard.disarm();

        match res {
            Ok(object) => {
                let mut slots = self.slots.write();
                let slot = Self::slot_mut(&mut slots, scope);
                slot.objects.insert(key.dyn_clone(), object.dyn_clone());
                let response = WaitResponse::Constructed(object.dyn_clone());
                self.notify_waiters(slots, scope, key, response);
                Ok(object.upcast_managed())
            }
            Err(err) => {
                let slots = self.slots.write();
                self.notify_waiters(slots, scope, key, WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut slots: RwLockWriteGuard<HashMap<usize, ScopeSlot>>,
        scope: &ScopeKey,
        key: &dyn Key,
        response: WaitResponse,
    ) {
        let context = slots
            .get_mut(&scope.address())
            .and_then(|slot| slot.constructing.remove(key));
        drop(slots);
        if let Some(context) = context {
            context.notify(response);
        }
    }
}

/// Withdraws an unfinished construction if `construct` unwinds, so that the
/// slot does not stay marked as constructing and waiters are woken up.
struct ConstructionGuard<'a> {
    cache: &'a ScopeCache,
    scope: &'a ScopeKey,
    key: &'a dyn Key,
}

impl ConstructionGuard<'_> {
    fn disarm(self) {
        mem::forget(self);
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        warn!(key = %self.key, scope = ?self.scope, "construction of shared object panicked");
        let err = ResolveError::ConstructionAborted {
            key: self.key.dyn_clone(),
        };
        let slots = self.cache.slots.write();
        self.cache
            .notify_waiters(slots, self.scope, self.key, WaitResponse::Error(err));
    }
}

struct ScopeSlot {
    owner: WeakScopeKey,
    objects: HashMap<Box<dyn Key>, Box<dyn SharedManaged>>,
    constructing: HashMap<Box<dyn Key>, ConstructingObjectContext>,
}

impl ScopeSlot {
    fn new(owner: WeakScopeKey) -> Self {
        Self {
            owner,
            objects: HashMap::new(),
            constructing: HashMap::new(),
        }
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

enum WaitResponse {
    Constructed(Box<dyn SharedManaged>),
    Error(ResolveError),
}

impl Clone for WaitResponse {
    fn clone(&self) -> Self {
        match self {
            Self::Constructed(object) => Self::Constructed(object.dyn_clone()),
            Self::Error(err) => Self::Error(err.clone()),
        }
    }
}
