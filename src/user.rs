// ── Collaborator identity ─────────────────────────────────────────────────────
//
// A `User` is a remote collaborator as seen by the local editor.  Its hue is
// the presence colour; the session may reassign it at any time, which is
// announced on `hue_changed`.

use std::{cell::Cell, fmt, rc::Rc};

use crate::signal::{Signal, Subscription};

/// Stable identity of a collaborator within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

/// Shared handle to a collaborator.
pub type UserHandle = Rc<User>;

pub struct User {
    id: UserId,
    name: String,
    hue: Cell<f64>,
    hue_changed: Signal<f64>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, hue: f64) -> UserHandle {
        Rc::new(Self {
            id,
            name: name.into(),
            hue: Cell::new(wrap_hue(hue)),
            hue_changed: Signal::new(),
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presence hue in `[0, 1)`.
    pub fn hue(&self) -> f64 {
        self.hue.get()
    }

    /// Reassign the presence hue.  Emits `hue_changed` only when the stored
    /// value actually changes.
    pub fn set_hue(&self, hue: f64) {
        let hue = wrap_hue(hue);
        if self.hue.get() != hue {
            self.hue.set(hue);
            self.hue_changed.emit(&hue);
        }
    }

    pub fn connect_hue_changed(&self, handler: impl Fn(&f64) + 'static) -> Subscription {
        self.hue_changed.connect(handler)
    }

    /// Live `hue_changed` handlers; lets a host check for leaked watchers.
    pub fn hue_watcher_count(&self) -> usize {
        self.hue_changed.handler_count()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("hue", &self.hue.get())
            .finish()
    }
}

/// Fold any finite hue into `[0, 1)`; non-finite input becomes `0.0`.
fn wrap_hue(hue: f64) -> f64 {
    if !hue.is_finite() {
        return 0.0;
    }
    let h = hue.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if h >= 1.0 { 0.0 } else { h }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
