use super::core::Configuration;
use parking_lot::RwLock;
use std::sync::Arc;

/// Configuration shared between the configure path (writer) and the check
/// path (reader).
///
/// Readers copy the whole configuration under the read lock; writers replace
/// it under the write lock. A check therefore never sees a configuration that
/// is half way through being changed.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Configuration>>,
}

impl SharedConfig {
    pub fn new(config: Configuration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Configuration {
        self.inner.read().clone()
    }

    /// Replace the configuration, returning the previous one.
    pub fn replace(&self, config: Configuration) -> Configuration {
        std::mem::replace(&mut *self.inner.write(), config)
    }

    /// Mutate in place under the write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut Configuration) -> R) -> R {
        f(&mut self.inner.write())
    }
}
