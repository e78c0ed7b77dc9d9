//! Online/offline switch gating every remote call.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Change reported by [`ConnectivityGate::set_online`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Offline to online.
    WentOnline,
    /// Online to offline.
    WentOffline,
}

/// Single source of truth for "can we talk to the remote store right now".
///
/// Starts offline; the storage supervisor and the host's explicit
/// connectivity events flip it.
pub struct ConnectivityGate {
    online: watch::Sender<bool>,
    /// Number of offline to online transitions so far.
    reconnects: AtomicU64,
    /// Value of `reconnects` covered by the last completed sweep.
    swept: AtomicU64,
}

impl ConnectivityGate {
    /// Gate in the given initial state, with no sweep owed.
    pub fn new(online: bool) -> Self {
        let (online, _rx) = watch::channel(online);
        Self {
            online,
            reconnects: AtomicU64::new(0),
            swept: AtomicU64::new(0),
        }
    }

    /// Current state.
    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Record the latest connectivity event; returns the transition only when
    /// the state actually changed.
    pub fn set_online(&self, online: bool) -> Option<Transition> {
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                if online {
                    self.reconnects.fetch_add(1, Ordering::SeqCst);
                }
                *current = online;
                true
            }
        });

        changed.then_some(if online {
            Transition::WentOnline
        } else {
            Transition::WentOffline
        })
    }

    /// Token naming the latest offline to online transition; hand it to
    /// [`mark_swept`](Self::mark_swept) once the sweep started after it is done.
    pub fn reconnect_token(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    /// Record that every record pending at `token` has been pushed.
    pub fn mark_swept(&self, token: u64) {
        self.swept.fetch_max(token, Ordering::SeqCst);
    }

    /// True between a transition to online and the end of the sweep that
    /// follows it. Snapshots must not be merged meanwhile.
    pub fn sweep_pending(&self) -> bool {
        self.swept.load(Ordering::SeqCst) < self.reconnects.load(Ordering::SeqCst)
    }

    /// Watch receiver yielding the new state after every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }
}

impl Default for ConnectivityGate {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_offline_by_default() {
        assert!(!ConnectivityGate::default().is_online());
    }

    #[test]
    fn reports_only_real_transitions() {
        let gate = ConnectivityGate::default();
        assert_eq!(gate.set_online(false), None);
        assert_eq!(gate.set_online(true), Some(Transition::WentOnline));
        assert_eq!(gate.set_online(true), None);
        assert!(gate.is_online());
        assert_eq!(gate.set_online(false), Some(Transition::WentOffline));
        assert!(!gate.is_online());
    }

    #[test]
    fn going_online_owes_a_sweep() {
        let gate = ConnectivityGate::default();
        assert!(!gate.sweep_pending());

        gate.set_online(true);
        let token = gate.reconnect_token();
        assert!(gate.sweep_pending());

        gate.set_online(false);
        gate.set_online(true);
        gate.mark_swept(token);
        assert!(gate.sweep_pending());

        gate.mark_swept(gate.reconnect_token());
        assert!(!gate.sweep_pending());
        gate.mark_swept(token);
        assert!(!gate.sweep_pending());
    }

    #[tokio::test]
    async fn subscribers_observe_transitions() {
        let gate = ConnectivityGate::default();
        let mut rx = gate.subscribe();
        gate.set_online(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}
