// ── Open document ─────────────────────────────────────────────────────────────
//
// Binds a session and its text buffer under one tab identity.  Tab labels and
// the active-document tracker compare documents by `DocumentId`, never by
// address.

use std::{fmt, rc::Rc};

use crate::{buffer::TextBuffer, session::Session};

/// Identity of an open document tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub String);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    title: String,
    session: Rc<Session>,
    buffer: Rc<TextBuffer>,
}

impl Document {
    pub fn new(
        id: DocumentId,
        title: impl Into<String>,
        session: Rc<Session>,
        buffer: Rc<TextBuffer>,
    ) -> Rc<Self> {
        Rc::new(Self {
            id,
            title: title.into(),
            session,
            buffer,
        })
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Document name as shown in the tab, without any modification marker.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn buffer(&self) -> &Rc<TextBuffer> {
        &self.buffer
    }
}
