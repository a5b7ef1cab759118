// ── Tab label controller ──────────────────────────────────────────────────────
//
// One `TabLabel` per open document tab.  It subscribes to the document's
// session and buffer and to the folder's focus changes, recomputes the
// affected display facets on every notification, and forwards them to the
// host sink.
//
// Subscriptions held:
//   • session changes (status, subscription group)
//   • buffer flag changes (modified, editable)
//   • buffer edits (insert/erase with author)
//   • folder focus changes
//   • one hue watch per recent editor (owned by `RecentEditorSet`)
//
// All callbacks hold a `Weak` to the label state; `close` (or drop) releases
// every subscription before the state goes away.  A notification that arrives
// while the state is already borrowed (a sink reacting by touching a model) is
// queued and handled as soon as the outer handler returns.

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::{Rc, Weak},
};

use tracing::{debug, trace, warn};

use crate::{
    buffer::{BufferChange, EditEvent},
    document::{Document, DocumentId},
    folder::Folder,
    session::{SessionChange, SessionStatus},
    signal::Subscription,
    theme::{Rgb, ThemeProvider},
    ui::{
        recent_editors::RecentEditorSet,
        tabs::{derive_color, derive_icon, derive_title, ColorClass, IconKind, TabDisplayState},
        TabLabelSink,
    },
    user::{UserHandle, UserId},
};

/// Prefix shown before the title of a locally modified document.
pub const DEFAULT_MODIFIED_MARKER: &str = "*";

/// Counts of subscriptions released by `TabLabel::close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Teardown {
    /// Session, buffer flags, buffer edits, folder.
    pub primary: usize,
    /// One per tracked recent editor.
    pub hue: usize,
}

impl Teardown {
    pub fn total(&self) -> usize {
        self.primary + self.hue
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

/// One model notification, as delivered to the label.
#[derive(Debug, Clone)]
enum Notification {
    Session(SessionChange),
    Buffer(BufferChange),
    Edit(EditEvent),
    Focus(Option<DocumentId>),
    Hue(UserId),
}

/// Label state plus the notifications that arrived while it was borrowed.
struct Shared {
    state: RefCell<LabelState>,
    pending: RefCell<VecDeque<Notification>>,
}

struct LabelState {
    this: Weak<Shared>,
    document: Rc<Document>,
    folder: Rc<Folder>,
    theme: Rc<dyn ThemeProvider>,
    marker: String,
    /// Set when others changed the document while it was unfocused and the
    /// session was running.
    changed: bool,
    recent: RecentEditorSet,
    display: TabDisplayState,
    sink: Box<dyn TabLabelSink>,
}

impl LabelState {
    fn subscribed(&self) -> bool {
        self.document.session().is_subscribed()
    }

    fn status(&self) -> SessionStatus {
        self.document.session().status()
    }

    fn update_icon(&mut self) {
        let icon = derive_icon(
            self.subscribed(),
            self.status(),
            self.document.buffer().is_editable(),
        );
        if icon != self.display.icon {
            debug!(document = %self.document.id(), icon = icon.as_str(), "tab icon changed");
        }
        self.display.icon = icon;
        self.sink.set_icon(icon);
    }

    fn update_color(&mut self) {
        let class = derive_color(self.changed, self.subscribed(), self.status());
        let rgb = class.resolve(self.theme.as_ref());
        self.display.color = class;
        self.display.color_rgb = rgb;
        self.sink.set_color(class, rgb);
    }

    fn update_title(&mut self) {
        let title = derive_title(
            self.document.title(),
            &self.marker,
            self.document.buffer().is_modified(),
            self.status(),
        );
        self.sink.set_title(&title);
        self.display.title = title;
    }

    fn update_dots(&mut self) {
        self.display.dots = self.recent.dots();
        self.sink.set_dots(&self.display.dots);
    }

    fn handle(&mut self, notification: Notification) {
        match notification {
            Notification::Session(change) => self.on_session_changed(change),
            Notification::Buffer(change) => self.on_buffer_changed(change),
            Notification::Edit(event) => self.on_edit(&event),
            Notification::Focus(current) => self.on_document_changed(current.as_ref()),
            Notification::Hue(user) => {
                trace!(document = %self.document.id(), %user, "recent editor hue changed");
                self.update_dots();
            }
        }
    }

    fn on_session_changed(&mut self, change: SessionChange) {
        trace!(document = %self.document.id(), ?change, "session changed");
        match change {
            SessionChange::Status => {
                self.update_icon();
                self.update_color();
                self.update_title();
            }
            SessionChange::SubscriptionGroup => {
                self.update_icon();
                self.update_color();
            }
        }
    }

    fn on_buffer_changed(&mut self, change: BufferChange) {
        match change {
            BufferChange::Modified => self.update_title(),
            BufferChange::Editable => self.update_icon(),
        }
    }

    fn on_edit(&mut self, event: &EditEvent) {
        if self.folder.is_current(self.document.id()) {
            return;
        }
        trace!(document = %self.document.id(), kind = ?event.kind, "remote edit in background tab");

        // TODO: drop a user's dot once all of their new contributions were undone.
        match &event.author {
            Some(author) => {
                let weak = Weak::clone(&self.this);
                let added = self
                    .recent
                    .insert_with(author, |user| watch_hue(user, weak));
                if added {
                    debug!(document = %self.document.id(), user = %author.id(), "recent editor added");
                    self.update_dots();
                }
            }
            None => warn!(document = %self.document.id(), "edit without author, no dot recorded"),
        }

        if !self.changed && self.status() == SessionStatus::Running {
            self.changed = true;
            self.update_color();
        }
    }

    fn on_document_changed(&mut self, current: Option<&DocumentId>) {
        if current != Some(self.document.id()) {
            return;
        }
        let had_dots = !self.recent.is_empty();
        self.recent.clear();
        if had_dots {
            self.update_dots();
        }
        self.changed = false;
        self.update_color();
    }
}

fn watch_hue(user: &UserHandle, label: Weak<Shared>) -> Subscription {
    let id = user.id();
    user.connect_hue_changed(move |_| deliver(&label, Notification::Hue(id)))
}

/// Hand `notification` to the label if it is still alive.
///
/// When the state is already borrowed further up the stack, the notification
/// is queued; whoever holds the borrow drains the queue before releasing it,
/// in arrival order.
fn deliver(weak: &Weak<Shared>, notification: Notification) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let Ok(mut state) = shared.state.try_borrow_mut() else {
        trace!(?notification, "tab label busy, notification queued");
        shared.pending.borrow_mut().push_back(notification);
        return;
    };
    state.handle(notification);
    loop {
        let next = shared.pending.borrow_mut().pop_front();
        match next {
            Some(queued) => state.handle(queued),
            None => break,
        }
    }
}

// ── TabLabel ──────────────────────────────────────────────────────────────────

/// Status controller for one document tab.
pub struct TabLabel {
    id: DocumentId,
    shared: Rc<Shared>,
    subscriptions: Vec<Subscription>,
}

impl TabLabel {
    /// Create the label, render its initial icon, colour and title, and
    /// subscribe to the document and the folder.
    pub fn new(
        document: Rc<Document>,
        folder: Rc<Folder>,
        theme: Rc<dyn ThemeProvider>,
        marker: impl Into<String>,
        sink: Box<dyn TabLabelSink>,
    ) -> Self {
        let id = document.id().clone();
        let shared = Rc::new_cyclic(|this| Shared {
            state: RefCell::new(LabelState {
                this: Weak::clone(this),
                document: Rc::clone(&document),
                folder: Rc::clone(&folder),
                theme,
                marker: marker.into(),
                changed: false,
                recent: RecentEditorSet::new(),
                display: TabDisplayState {
                    icon: IconKind::Disconnected,
                    color: ColorClass::Dim,
                    color_rgb: Rgb { r: 0, g: 0, b: 0 },
                    title: String::new(),
                    dots: Vec::new(),
                },
                sink,
            }),
            pending: RefCell::new(VecDeque::new()),
        });

        {
            let mut s = shared.state.borrow_mut();
            s.update_icon();
            s.update_color();
            s.update_title();
        }

        let weak = Rc::downgrade(&shared);
        let subscriptions = vec![
            document.session().connect_changed({
                let weak = Weak::clone(&weak);
                move |change| deliver(&weak, Notification::Session(*change))
            }),
            document.buffer().connect_changed({
                let weak = Weak::clone(&weak);
                move |change| deliver(&weak, Notification::Buffer(*change))
            }),
            document.buffer().connect_edit({
                let weak = Weak::clone(&weak);
                move |event| deliver(&weak, Notification::Edit(event.clone()))
            }),
            folder.connect_document_changed(move |current| {
                deliver(&weak, Notification::Focus(current.clone()))
            }),
        ];

        debug!(document = %id, "tab label opened");
        Self {
            id,
            shared,
            subscriptions,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.id
    }

    /// Current display state, derived from the latest inputs.
    pub fn display(&self) -> TabDisplayState {
        self.shared.state.borrow().display.clone()
    }

    pub fn is_changed(&self) -> bool {
        self.shared.state.borrow().changed
    }

    /// Recent editors in the order they first edited.
    pub fn recent_editors(&self) -> Vec<UserId> {
        self.shared.state.borrow().recent.ids()
    }

    /// Live subscriptions held by this label, hue watches included.
    pub fn subscription_count(&self) -> usize {
        let primary = self.subscriptions.iter().filter(|s| s.is_connected()).count();
        primary + self.shared.state.borrow().recent.len()
    }

    pub fn is_closed(&self) -> bool {
        self.subscriptions.iter().all(|s| !s.is_connected())
    }

    /// Release every subscription.  Safe to call more than once; later calls
    /// release nothing.
    pub fn close(&mut self) -> Teardown {
        let primary: usize = self
            .subscriptions
            .iter_mut()
            .map(|s| usize::from(s.disconnect()))
            .sum();
        self.shared.pending.borrow_mut().clear();
        let hue = match self.shared.state.try_borrow_mut() {
            Ok(mut s) => s.recent.clear(),
            Err(_) => 0,
        };
        let teardown = Teardown { primary, hue };
        if teardown.total() > 0 {
            debug!(document = %self.id, primary, hue, "tab label closed");
        }
        teardown
    }
}

impl Drop for TabLabel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TabLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabLabel")
            .field("document", &self.id)
            .field("display", &self.shared.state.borrow().display)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        buffer::{EditKind, TextBuffer},
        session::{GroupId, Session},
        theme::PaletteTheme,
        ui::{tabs::Dot, RecordingSink, SinkEvent},
        user::User,
    };

    struct Fixture {
        folder: Rc<Folder>,
        session: Rc<Session>,
        buffer: Rc<TextBuffer>,
        label: TabLabel,
        sink: RecordingSink,
    }

    fn doc_id() -> DocumentId {
        DocumentId("notes".into())
    }

    fn fixture(status: SessionStatus, subscribed: bool, editable: bool) -> Fixture {
        let folder = Rc::new(Folder::new());
        let group = subscribed.then(|| GroupId("g1".into()));
        let session = Rc::new(Session::with_state(status, group));
        let buffer = Rc::new(TextBuffer::new());
        buffer.set_editable(editable);
        let document = Document::new(doc_id(), "notes.txt", Rc::clone(&session), Rc::clone(&buffer));
        let sink = RecordingSink::new();
        let label = TabLabel::new(
            document,
            Rc::clone(&folder),
            Rc::new(PaletteTheme::for_mode(false)),
            DEFAULT_MODIFIED_MARKER,
            Box::new(sink.clone()),
        );
        Fixture {
            folder,
            session,
            buffer,
            label,
            sink,
        }
    }

    fn running() -> Fixture {
        fixture(SessionStatus::Running, true, true)
    }

    #[test]
    fn initial_render_covers_icon_color_and_title() {
        let f = fixture(SessionStatus::Synchronizing, true, true);
        let events = f.sink.take();
        assert_eq!(
            events,
            vec![
                SinkEvent::Icon(IconKind::Syncing),
                SinkEvent::Color(ColorClass::Dim, PaletteTheme::for_mode(false).dim_foreground()),
                SinkEvent::Title("notes.txt".into()),
            ]
        );
        assert!(f.label.display().dots.is_empty());
    }

    #[test]
    fn icon_follows_every_input() {
        let f = fixture(SessionStatus::Synchronizing, false, true);
        assert_eq!(f.label.display().icon, IconKind::Disconnected);

        f.session.set_subscription_group(Some(GroupId("g".into())));
        assert_eq!(f.label.display().icon, IconKind::Syncing);

        f.session.set_status(SessionStatus::Running);
        assert_eq!(f.label.display().icon, IconKind::Editable);

        f.buffer.set_editable(false);
        assert_eq!(f.label.display().icon, IconKind::ReadOnly);

        f.session.set_status(SessionStatus::Closed);
        assert_eq!(f.label.display().icon, IconKind::Stopped);

        f.session.set_subscription_group(None);
        assert_eq!(f.label.display().icon, IconKind::Disconnected);
    }

    #[test]
    fn editable_change_only_touches_icon() {
        let f = running();
        f.sink.take();
        f.buffer.set_editable(false);
        assert_eq!(f.sink.take(), vec![SinkEvent::Icon(IconKind::ReadOnly)]);
    }

    #[test]
    fn modified_change_only_touches_title() {
        let f = running();
        f.sink.take();
        f.buffer.set_modified(true);
        assert_eq!(f.sink.take(), vec![SinkEvent::Title("*notes.txt".into())]);
    }

    #[test]
    fn marker_suppressed_while_synchronizing_and_shown_once_running() {
        let f = fixture(SessionStatus::Synchronizing, true, true);
        f.buffer.set_modified(true);
        assert_eq!(f.label.display().title, "notes.txt");

        f.session.set_status(SessionStatus::Running);
        assert_eq!(f.label.display().title, "*notes.txt");
    }

    #[test]
    fn alert_survives_status_toggles() {
        let f = running();
        let alice = User::new(UserId(1), "alice", 0.0);
        f.buffer.notify_edit(EditKind::Insert, Some(alice));
        assert_eq!(f.label.display().color, ColorClass::Alert);

        for status in [SessionStatus::Synchronizing, SessionStatus::Closed, SessionStatus::Running] {
            f.session.set_status(status);
            assert_eq!(f.label.display().color, ColorClass::Alert);
        }
        f.session.set_subscription_group(None);
        assert_eq!(f.label.display().color, ColorClass::Alert);
    }

    #[test]
    fn edits_in_active_tab_are_ignored() {
        let f = running();
        f.folder.switch_to(Some(doc_id()));
        let alice = User::new(UserId(1), "alice", 0.0);

        f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&alice)));
        f.buffer.notify_edit(EditKind::Erase, Some(alice));

        assert!(f.label.recent_editors().is_empty());
        assert!(!f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Default);
    }

    #[test]
    fn same_author_twice_yields_one_dot() {
        let f = running();
        let alice = User::new(UserId(1), "alice", 0.0);
        f.sink.take();

        f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&alice)));
        f.buffer.notify_edit(EditKind::Erase, Some(Rc::clone(&alice)));

        assert_eq!(f.label.recent_editors(), vec![UserId(1)]);
        assert_eq!(alice.hue_watcher_count(), 1);
        let dot_renders = f
            .sink
            .take()
            .into_iter()
            .filter(|e| matches!(e, SinkEvent::Dots(_)))
            .count();
        assert_eq!(dot_renders, 1);
    }

    #[test]
    fn changed_needs_running_session_but_dots_do_not() {
        let f = fixture(SessionStatus::Synchronizing, true, true);
        f.buffer.notify_edit(EditKind::Insert, Some(User::new(UserId(2), "bob", 0.2)));

        assert_eq!(f.label.recent_editors(), vec![UserId(2)]);
        assert!(!f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Dim);
    }

    #[test]
    fn anonymous_edit_marks_changed_without_dot() {
        let f = running();
        f.buffer.notify_edit(EditKind::Insert, None);

        assert!(f.label.recent_editors().is_empty());
        assert!(f.label.display().dots.is_empty());
        assert!(f.label.is_changed());
    }

    #[test]
    fn activation_clears_dots_and_changed() {
        let f = running();
        let users: Vec<_> = (1..=2).map(|i| User::new(UserId(i), "u", 0.1 * i as f64)).collect();
        for u in &users {
            f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(u)));
        }
        assert_eq!(f.label.recent_editors().len(), 2);

        f.folder.switch_to(Some(doc_id()));

        assert!(f.label.recent_editors().is_empty());
        assert!(!f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Default);
        assert!(f.label.display().dots.is_empty());
        assert!(users.iter().all(|u| u.hue_watcher_count() == 0));
    }

    #[test]
    fn activating_another_tab_keeps_annotations() {
        let f = running();
        f.buffer.notify_edit(EditKind::Insert, Some(User::new(UserId(1), "a", 0.0)));
        f.folder.switch_to(Some(DocumentId("other".into())));

        assert_eq!(f.label.recent_editors(), vec![UserId(1)]);
        assert!(f.label.is_changed());
    }

    #[test]
    fn hue_change_rerenders_dots_only() {
        let f = running();
        let alice = User::new(UserId(1), "alice", 0.0);
        let bob = User::new(UserId(2), "bob", 0.5);
        f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&alice)));
        f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&bob)));
        f.sink.take();

        alice.set_hue(0.5);

        let events = f.sink.take();
        assert_eq!(
            events,
            vec![SinkEvent::Dots(vec![
                Dot::for_user(UserId(1), 0.5),
                Dot::for_user(UserId(2), 0.5),
            ])]
        );
        assert_eq!(f.label.recent_editors(), vec![UserId(1), UserId(2)]);
    }

    #[test]
    fn unrelated_changes_do_not_rerender_dots() {
        let f = running();
        f.buffer.notify_edit(EditKind::Insert, Some(User::new(UserId(1), "a", 0.0)));
        f.sink.take();

        f.session.set_status(SessionStatus::Closed);
        f.buffer.set_modified(true);
        f.buffer.set_editable(false);

        assert!(!f.sink.take().iter().any(|e| matches!(e, SinkEvent::Dots(_))));
    }

    #[test]
    fn read_only_scenario_alert_then_default() {
        let f = fixture(SessionStatus::Running, true, false);
        assert_eq!(f.label.display().icon, IconKind::ReadOnly);

        let a = User::new(UserId(1), "A", 0.0);
        f.buffer.notify_edit(EditKind::Insert, Some(a));
        assert_eq!(f.label.recent_editors(), vec![UserId(1)]);
        assert!(f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Alert);
        assert_eq!(f.label.display().dots[0].color.to_hex(), "#993d3d");

        f.folder.switch_to(Some(doc_id()));
        assert!(f.label.recent_editors().is_empty());
        assert!(!f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Default);
    }

    #[test]
    fn activation_during_edit_burst_clears_annotations() {
        let f = running();
        let folder = Rc::clone(&f.folder);
        let _focus = f
            .buffer
            .connect_edit(move |_| folder.switch_to(Some(doc_id())));

        f.buffer.notify_edit(EditKind::Insert, Some(User::new(UserId(1), "alice", 0.0)));
        f.buffer.notify_edit(EditKind::Insert, Some(User::new(UserId(2), "bob", 0.5)));

        assert!(f.label.recent_editors().is_empty());
        assert!(!f.label.is_changed());
        assert_eq!(f.label.display().color, ColorClass::Default);
        assert!(f.label.display().dots.is_empty());
    }

    /// Focuses the tab as soon as it is asked to show the alert colour.
    struct FocusOnAlert {
        folder: Rc<Folder>,
        inner: RecordingSink,
    }

    impl TabLabelSink for FocusOnAlert {
        fn set_icon(&mut self, icon: IconKind) {
            self.inner.set_icon(icon);
        }

        fn set_title(&mut self, title: &str) {
            self.inner.set_title(title);
        }

        fn set_color(&mut self, class: ColorClass, color: Rgb) {
            self.inner.set_color(class, color);
            if class == ColorClass::Alert {
                self.folder.switch_to(Some(doc_id()));
            }
        }

        fn set_dots(&mut self, dots: &[Dot]) {
            self.inner.set_dots(dots);
        }
    }

    #[test]
    fn focus_requested_by_sink_is_applied_after_the_update() {
        let folder = Rc::new(Folder::new());
        let session = Rc::new(Session::with_state(
            SessionStatus::Running,
            Some(GroupId("g1".into())),
        ));
        let buffer = Rc::new(TextBuffer::new());
        let document = Document::new(doc_id(), "notes.txt", session, Rc::clone(&buffer));
        let log = RecordingSink::new();
        let label = TabLabel::new(
            document,
            Rc::clone(&folder),
            Rc::new(PaletteTheme::for_mode(false)),
            DEFAULT_MODIFIED_MARKER,
            Box::new(FocusOnAlert {
                folder: Rc::clone(&folder),
                inner: log.clone(),
            }),
        );
        log.take();

        let alice = User::new(UserId(1), "alice", 0.0);
        buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&alice)));

        assert!(folder.is_current(&doc_id()));
        assert!(!label.is_changed());
        assert_eq!(label.display().color, ColorClass::Default);
        assert!(label.display().dots.is_empty());
        assert_eq!(alice.hue_watcher_count(), 0);

        let colors: Vec<_> = log
            .take()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Color(class, _) => Some(class),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![ColorClass::Alert, ColorClass::Default]);
    }

    #[test]
    fn teardown_releases_everything_once() {
        let mut f = running();
        let users: Vec<_> = (1..=3).map(|i| User::new(UserId(i), "u", 0.0)).collect();
        for u in &users {
            f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(u)));
        }
        assert_eq!(f.label.subscription_count(), 7);

        let teardown = f.label.close();
        assert_eq!(teardown, Teardown { primary: 4, hue: 3 });
        assert!(f.label.is_closed());
        assert_eq!(f.session.watcher_count(), 0);
        assert_eq!(f.buffer.watcher_count(), 0);
        assert_eq!(f.folder.watcher_count(), 0);
        assert!(users.iter().all(|u| u.hue_watcher_count() == 0));

        assert_eq!(f.label.close(), Teardown::default());
    }

    #[test]
    fn no_callbacks_after_close() {
        let mut f = running();
        let alice = User::new(UserId(1), "alice", 0.0);
        f.buffer.notify_edit(EditKind::Insert, Some(Rc::clone(&alice)));
        f.label.close();
        f.sink.take();

        f.session.set_status(SessionStatus::Closed);
        f.buffer.set_modified(true);
        f.buffer.notify_edit(EditKind::Insert, None);
        alice.set_hue(0.7);
        f.folder.switch_to(Some(doc_id()));

        assert!(f.sink.is_empty());
    }

    #[test]
    fn dropping_label_detaches_models() {
        let f = running();
        let Fixture {
            folder,
            session,
            buffer,
            label,
            ..
        } = f;
        drop(label);
        assert_eq!(session.watcher_count(), 0);
        assert_eq!(buffer.watcher_count(), 0);
        assert_eq!(folder.watcher_count(), 0);
    }
}
