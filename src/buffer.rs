// ── Text buffer model ─────────────────────────────────────────────────────────
//
// The parts of a shared text buffer the tab label observes: the local
// "modified since last save" flag, whether the local view accepts input, and
// the stream of applied insert/erase operations tagged with their author.

use std::{cell::Cell, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    signal::{Signal, Subscription},
    user::UserHandle,
};

/// Flag that changed on a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferChange {
    Modified,
    Editable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Insert,
    Erase,
}

/// One applied operation.  `author` is `None` when the session could not
/// attribute the change to a known user.
#[derive(Debug, Clone)]
pub struct EditEvent {
    pub kind: EditKind,
    pub author: Option<UserHandle>,
}

pub struct TextBuffer {
    modified: Cell<bool>,
    editable: Cell<bool>,
    changes: Signal<BufferChange>,
    edits: Signal<EditEvent>,
}

impl TextBuffer {
    /// A clean, editable buffer.
    pub fn new() -> Self {
        Self {
            modified: Cell::new(false),
            editable: Cell::new(true),
            changes: Signal::new(),
            edits: Signal::new(),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    pub fn is_editable(&self) -> bool {
        self.editable.get()
    }

    pub fn set_modified(&self, modified: bool) {
        if self.modified.replace(modified) != modified {
            self.changes.emit(&BufferChange::Modified);
        }
    }

    pub fn set_editable(&self, editable: bool) {
        if self.editable.replace(editable) != editable {
            self.changes.emit(&BufferChange::Editable);
        }
    }

    /// Announce an operation that has already been applied to the text.
    pub fn notify_edit(&self, kind: EditKind, author: Option<UserHandle>) {
        self.edits.emit(&EditEvent { kind, author });
    }

    /// Subscribe to modified/editable flag changes.
    pub fn connect_changed(&self, handler: impl Fn(&BufferChange) + 'static) -> Subscription {
        self.changes.connect(handler)
    }

    /// Subscribe to applied insert/erase operations.
    pub fn connect_edit(&self, handler: impl Fn(&EditEvent) + 'static) -> Subscription {
        self.edits.connect(handler)
    }

    pub fn watcher_count(&self) -> usize {
        self.changes.handler_count() + self.edits.handler_count()
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBuffer")
            .field("modified", &self.modified.get())
            .field("editable", &self.editable.get())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
