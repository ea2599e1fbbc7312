//! Synchronous signal/slot notification.
//!
//! A trimmed-down signal type for change notification from the adapter:
//! slots are invoked directly, in the emitting thread, in connection
//! order. There is no queued or cross-thread delivery here — the
//! adapter is a single-owner, synchronous structure, and emission
//! happens inside its mutation methods.
//!
//! # Example
//!
//! ```
//! use horizon_arbor::Signal;
//!
//! let rebuilt = Signal::<usize>::new();
//!
//! let conn_id = rebuilt.connect(|count| {
//!     println!("forest rebuilt with {count} records");
//! });
//!
//! rebuilt.emit(42);
//! rebuilt.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Returned by [`Signal::connect`]; pass it to
    /// [`Signal::disconnect`] to remove the connection.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal with directly-invoked slots.
///
/// When emitted, all connected slots run to completion before `emit`
/// returns. Emission can be temporarily suppressed with
/// [`set_blocked`](Signal::set_blocked).
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Creates a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connects a slot (closure) to this signal.
    ///
    /// Returns a [`ConnectionId`] that can be used to disconnect the
    /// slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Connects a slot and returns an RAII guard that disconnects it
    /// when dropped.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: self,
            id: Some(self.connect(slot)),
        }
    }

    /// Disconnects a previously connected slot.
    ///
    /// Returns `true` if the connection existed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnects all slots.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Returns the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Blocks or unblocks emission; returns the previous state.
    ///
    /// While blocked, [`emit`](Signal::emit) is a no-op.
    pub fn set_blocked(&self, blocked: bool) -> bool {
        self.blocked.swap(blocked, Ordering::Relaxed)
    }

    /// Returns whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Relaxed)
    }

    /// Emits the signal, invoking every connected slot with `args`.
    ///
    /// Slots run in connection order. The connection list is snapshotted
    /// before invocation, so a slot may connect or disconnect without
    /// deadlocking; changes take effect on the next emit.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            return;
        }
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

/// RAII guard for a signal connection.
///
/// Disconnects the slot when dropped. Returned by
/// [`Signal::connect_guarded`].
#[derive(Debug)]
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: Option<ConnectionId>,
}

impl<Args> ConnectionGuard<'_, Args> {
    /// Returns the underlying connection id.
    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Disconnects immediately instead of waiting for drop.
    pub fn disconnect_now(mut self) {
        if let Some(id) = self.id.take() {
            self.signal.disconnect(id);
        }
    }
}

impl<Args> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.signal.disconnect(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_connect_emit_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv = received.clone();
        let id = signal.connect(move |value| {
            recv.lock().push(*value);
        });

        signal.emit(1);
        signal.emit(2);
        assert_eq!(*received.lock(), vec![1, 2]);

        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        signal.emit(3);
        assert_eq!(*received.lock(), vec![1, 2]);
    }

    #[test]
    fn test_blocked_emission() {
        let signal = Signal::<()>::new();
        let counter = Arc::new(Mutex::new(0));

        let c = counter.clone();
        signal.connect(move |_| {
            *c.lock() += 1;
        });

        assert!(!signal.set_blocked(true));
        signal.emit(());
        assert_eq!(*counter.lock(), 0);

        assert!(signal.set_blocked(false));
        signal.emit(());
        assert_eq!(*counter.lock(), 1);
    }

    #[test]
    fn test_connection_guard() {
        let signal = Signal::<()>::new();
        {
            let _guard = signal.connect_guarded(|_| {});
            assert_eq!(signal.connection_count(), 1);
        }
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_multiple_slots_in_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let o = order.clone();
            signal.connect(move |_| o.lock().push(tag));
        }

        signal.emit(());
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }
}
