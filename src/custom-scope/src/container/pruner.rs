use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{trace, warn};

use crate::container::cache::ScopeCache;

/// A background thread which periodically prunes a [`ScopeCache`].
///
/// The thread stops once the [`CachePruner`] is dropped or the cache is gone.
/// Dropping the pruner does not wait for the thread to exit.
pub(super) struct CachePruner {
    signal: Arc<StopSignal>,
}

impl CachePruner {
    pub fn spawn(cache: Weak<ScopeCache>, interval: Duration) -> Option<Self> {
        let signal = Arc::new(StopSignal::new());
        let res = thread::Builder::new()
            .name("custom-scope-pruner".into())
            .spawn({
                let signal = Arc::clone(&signal);
                move || run(&cache, interval, &signal)
            });

        match res {
            Ok(_) => Some(Self { signal }),
            Err(err) => {
                warn!(error = %err, "failed to spawn the cache pruning thread");
                None
            }
        }
    }
}

impl Drop for CachePruner {
    fn drop(&mut self) {
        self.signal.stop();
    }
}

struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            stopped: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn stop(&self) {
        *self.stopped.lock() = true;
        self.condvar.notify_all();
    }

    /// Sleeps for `timeout` at most and returns true if the pruner should stop.
    fn wait_for(&self, timeout: Duration) -> bool {
        let mut stopped = self.stopped.lock();
        if !*stopped {
            self.condvar.wait_for(&mut stopped, timeout);
        }
        *stopped
    }
}

fn run(cache: &Weak<ScopeCache>, interval: Duration, signal: &StopSignal) {
    trace!(?interval, "cache pruning thread started");
    while !signal.wait_for(interval) {
        let Some(cache) = cache.upgrade() else {
            break;
        };
        cache.prune();
    }
    trace!("cache pruning thread stopped");
}
