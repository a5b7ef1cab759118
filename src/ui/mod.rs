// ── Tab label presentation ────────────────────────────────────────────────────
//
// `tabs` holds the pure derivation rules, `recent_editors` the "changed by"
// set, and `label` the controller that wires both to the document's signals.
// Rendering is the host's job: the controller only talks to a `TabLabelSink`.

pub mod label;
pub mod recent_editors;
pub mod tabs;

use std::{cell::RefCell, rc::Rc};

use crate::theme::Rgb;

use self::tabs::{ColorClass, Dot, IconKind};

/// Receiver of re-render requests for one tab.
///
/// Calls arrive on the UI thread while the controller is updating.  An
/// implementation may react by changing a model (focusing the tab, say); the
/// resulting notification is applied right after the current update finishes.
pub trait TabLabelSink {
    fn set_icon(&mut self, icon: IconKind);
    fn set_title(&mut self, title: &str);
    fn set_color(&mut self, class: ColorClass, color: Rgb);
    /// `dots` is empty when the strip should be hidden.
    fn set_dots(&mut self, dots: &[Dot]);
}

/// One re-render request, as captured by `RecordingSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Icon(IconKind),
    Title(String),
    Color(ColorClass, Rgb),
    Dots(Vec<Dot>),
}

/// A sink that appends every request to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Rc<RefCell<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl TabLabelSink for RecordingSink {
    fn set_icon(&mut self, icon: IconKind) {
        self.log.borrow_mut().push(SinkEvent::Icon(icon));
    }

    fn set_title(&mut self, title: &str) {
        self.log.borrow_mut().push(SinkEvent::Title(title.to_owned()));
    }

    fn set_color(&mut self, class: ColorClass, color: Rgb) {
        self.log.borrow_mut().push(SinkEvent::Color(class, color));
    }

    fn set_dots(&mut self, dots: &[Dot]) {
        self.log.borrow_mut().push(SinkEvent::Dots(dots.to_vec()));
    }
}
