use std::time::Duration;

/// Tunables of a [`Kernel`].
///
/// [`Kernel`]: crate::container::Kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSettings {
    cache_pruning_interval: Option<Duration>,
}

impl KernelSettings {
    pub const DEFAULT_CACHE_PRUNING_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self {
            cache_pruning_interval: Some(Self::DEFAULT_CACHE_PRUNING_INTERVAL),
        }
    }

    /// Sets how often a background thread releases the objects of dropped
    /// scopes.
    pub fn with_cache_pruning_interval(mut self, interval: Duration) -> Self {
        self.cache_pruning_interval = Some(interval);
        self
    }

    /// Disables the background pruning thread. Objects of dropped scopes are
    /// then only released by [`Kernel::prune_cache`].
    ///
    /// [`Kernel::prune_cache`]: crate::container::Kernel::prune_cache
    pub fn without_cache_pruning(mut self) -> Self {
        self.cache_pruning_interval = None;
        self
    }

    pub fn cache_pruning_interval(&self) -> Option<Duration> {
        self.cache_pruning_interval
    }
}

impl Default for KernelSettings {
    fn default() -> Self {
        Self::new()
    }
}
