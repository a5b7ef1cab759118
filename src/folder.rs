// ── Active-document tracker ───────────────────────────────────────────────────
//
// The folder is the tab container.  It knows which document is focused and
// announces every focus change so tab labels can reset their "changed by
// others" annotations.

use std::{cell::RefCell, fmt};

use tracing::debug;

use crate::{
    document::DocumentId,
    signal::{Signal, Subscription},
};

pub struct Folder {
    current: RefCell<Option<DocumentId>>,
    document_changed: Signal<Option<DocumentId>>,
}

impl Folder {
    pub fn new() -> Self {
        Self {
            current: RefCell::new(None),
            document_changed: Signal::new(),
        }
    }

    /// The focused document, if any.
    pub fn current_document(&self) -> Option<DocumentId> {
        self.current.borrow().clone()
    }

    pub fn is_current(&self, id: &DocumentId) -> bool {
        self.current.borrow().as_ref() == Some(id)
    }

    /// Focus `document` (or nothing).  Re-focusing the current document is a
    /// no-op.
    pub fn switch_to(&self, document: Option<DocumentId>) {
        {
            let mut current = self.current.borrow_mut();
            if *current == document {
                return;
            }
            *current = document.clone();
        }
        debug!(document = ?document, "active document changed");
        self.document_changed.emit(&document);
    }

    pub fn connect_document_changed(
        &self,
        handler: impl Fn(&Option<DocumentId>) + 'static,
    ) -> Subscription {
        self.document_changed.connect(handler)
    }

    pub fn watcher_count(&self) -> usize {
        self.document_changed.handler_count()
    }
}

impl Default for Folder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("current", &*self.current.borrow())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn switching_to_same_document_is_silent() {
        let folder = Folder::new();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&hits);
        let _sub = folder.connect_document_changed(move |d| log.borrow_mut().push(d.clone()));

        let a = DocumentId("a".into());
        folder.switch_to(Some(a.clone()));
        folder.switch_to(Some(a.clone()));
        folder.switch_to(None);

        assert_eq!(*hits.borrow(), vec![Some(a), None]);
        assert_eq!(folder.current_document(), None);
    }
}
