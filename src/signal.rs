// ── Notification primitive ────────────────────────────────────────────────────
//
// Single-threaded observer registration.  Every `connect` hands back a
// `Subscription`; dropping it (or calling `disconnect`) removes the handler.
// All models in this crate (session, buffer, user, folder) expose their
// notification streams through `Signal<T>`.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

type Handler<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    id: u64,
    handler: Handler<T>,
}

struct Registry<T> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Slot<T>>>,
}

impl<T> Registry<T> {
    fn remove(&self, id: u64) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|s| s.id != id);
        slots.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.slots.borrow().iter().any(|s| s.id == id)
    }
}

// ── Signal ────────────────────────────────────────────────────────────────────

/// A notification stream carrying values of type `T`.
pub struct Signal<T: 'static> {
    registry: Rc<Registry<T>>,
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_id: Cell::new(1),
                slots: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register `handler`.  It stays connected until the returned
    /// `Subscription` is disconnected or dropped.
    #[must_use = "dropping the subscription disconnects the handler"]
    pub fn connect(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        self.registry.slots.borrow_mut().push(Slot {
            id,
            handler: Rc::new(handler),
        });

        let weak: Weak<Registry<T>> = Rc::downgrade(&self.registry);
        Subscription {
            id,
            detach: Some(Box::new(move || {
                weak.upgrade().is_some_and(|r| r.remove(id))
            })),
        }
    }

    /// Deliver `value` to every connected handler, in connection order.
    ///
    /// Handlers are snapshotted first so they may connect or disconnect while
    /// the emission runs.  A handler disconnected mid-emission is skipped.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(u64, Handler<T>)> = self
            .registry
            .slots
            .borrow()
            .iter()
            .map(|s| (s.id, Rc::clone(&s.handler)))
            .collect();

        for (id, handler) in snapshot {
            if self.registry.contains(id) {
                handler(value);
            }
        }
    }

    /// Number of currently connected handlers.
    pub fn handler_count(&self) -> usize {
        self.registry.slots.borrow().len()
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

// ── Subscription ──────────────────────────────────────────────────────────────

/// Disposable handle for one connected handler.
pub struct Subscription {
    id: u64,
    detach: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    /// Remove the handler.  Returns `true` only for the call that actually
    /// released it; later calls (and calls after the signal itself was
    /// dropped) return `false`.
    pub fn disconnect(&mut self) -> bool {
        match self.detach.take() {
            Some(detach) => detach(),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.detach.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
