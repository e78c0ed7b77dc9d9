use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    config::AppConfig, dao::remote_store::RemoteStore, services::retry::RetryPolicy,
    state::connectivity::ConnectivityGate,
};

/// Everything a [`LocalRemoteStore`](super::LocalRemoteStore) needs to reach
/// the remote store: the gate, the installed backend and the retry policies.
pub struct SyncContext {
    gate: ConnectivityGate,
    remote: RwLock<Option<Arc<dyn RemoteStore>>>,
    read_policy: RetryPolicy,
    write_policy: RetryPolicy,
}

impl SyncContext {
    /// Offline context with the given policies and no backend.
    pub fn new(read_policy: RetryPolicy, write_policy: RetryPolicy) -> Self {
        Self {
            gate: ConnectivityGate::default(),
            remote: RwLock::new(None),
            read_policy,
            write_policy,
        }
    }

    /// Offline context using the configured retry settings.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            RetryPolicy::read().with_settings(config.read_retry),
            RetryPolicy::write().with_settings(config.write_retry),
        )
    }

    /// Connectivity gate.
    pub fn gate(&self) -> &ConnectivityGate {
        &self.gate
    }

    /// The installed backend, regardless of connectivity.
    pub fn remote(&self) -> Option<Arc<dyn RemoteStore>> {
        self.remote
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The installed backend, only while the gate reports online.
    pub fn remote_if_online(&self) -> Option<Arc<dyn RemoteStore>> {
        if self.gate.is_online() {
            self.remote()
        } else {
            None
        }
    }

    /// Make `store` the backend used while online.
    pub fn install_remote(&self, store: Arc<dyn RemoteStore>) {
        *self.remote.write().unwrap_or_else(PoisonError::into_inner) = Some(store);
    }

    /// Drop the backend, e.g. after reconnects are exhausted.
    pub fn clear_remote(&self) {
        self.remote
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Policy for snapshot reads and fetches.
    pub fn read_policy(&self) -> &RetryPolicy {
        &self.read_policy
    }

    /// Policy for creates, replaces and deletes.
    pub fn write_policy(&self) -> &RetryPolicy {
        &self.write_policy
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new(RetryPolicy::read(), RetryPolicy::write())
    }
}
