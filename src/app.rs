// ── Replay host ───────────────────────────────────────────────────────────────
//
// A single `App` owns the models for every scripted document, one tab label
// per document, and the folder that tracks focus.  It applies script events
// to the models and turns whatever the labels asked to re-render into plain
// text lines.  All mutations happen on one thread; there is no global state.

use std::{
    collections::{hash_map::Entry, HashMap},
    rc::Rc,
};

use tracing::{debug, info};

use crate::{
    buffer::TextBuffer,
    config::Config,
    document::{Document, DocumentId},
    error::{CotabError, Result},
    folder::Folder,
    script::{DocumentSpec, Script, ScriptEvent},
    session::{GroupId, Session},
    theme::ThemeProvider,
    ui::{
        label::TabLabel,
        tabs::{Dot, TabDisplayState},
        RecordingSink, SinkEvent,
    },
    user::{User, UserHandle, UserId},
};

struct Tab {
    document: Rc<Document>,
    label: TabLabel,
    sink: RecordingSink,
}

/// Top-level replay state.
pub struct App {
    config: Config,
    theme: Rc<dyn ThemeProvider>,
    folder: Rc<Folder>,
    users: HashMap<u32, UserHandle>,
    /// In declaration order; closed tabs are removed.
    tabs: Vec<Tab>,
}

impl App {
    /// Build models and labels for every document and user in `script`.
    /// Events are not applied.  Ids must be unique within the script.
    pub fn new(script: &Script, config: Config) -> Result<Self> {
        let theme = config.theme();
        let mut app = Self {
            config,
            theme,
            folder: Rc::new(Folder::new()),
            users: HashMap::new(),
            tabs: Vec::new(),
        };
        for user in &script.users {
            match app.users.entry(user.id) {
                Entry::Occupied(_) => return Err(CotabError::DuplicateUser(user.id)),
                Entry::Vacant(slot) => {
                    slot.insert(User::new(UserId(user.id), user.name.clone(), user.hue));
                }
            }
        }
        for spec in &script.documents {
            if app.tab(&spec.id).is_ok() {
                return Err(CotabError::DuplicateDocument(spec.id.clone()));
            }
            app.open(spec);
        }
        Ok(app)
    }

    fn open(&mut self, spec: &DocumentSpec) {
        let session = Rc::new(Session::with_state(
            spec.status,
            spec.subscription_group.clone().map(GroupId),
        ));
        let buffer = Rc::new(TextBuffer::new());
        buffer.set_editable(spec.editable);
        buffer.set_modified(spec.modified);

        let document = Document::new(DocumentId(spec.id.clone()), spec.title.clone(), session, buffer);
        let sink = RecordingSink::new();
        let label = TabLabel::new(
            Rc::clone(&document),
            Rc::clone(&self.folder),
            Rc::clone(&self.theme),
            self.config.modified_marker.clone(),
            Box::new(sink.clone()),
        );
        debug!(document = %spec.id, "tab opened");
        self.tabs.push(Tab {
            document,
            label,
            sink,
        });
    }

    fn tab(&self, id: &str) -> Result<&Tab> {
        self.tabs
            .iter()
            .find(|t| t.document.id().0 == id)
            .ok_or_else(|| CotabError::UnknownDocument(id.to_owned()))
    }

    fn user(&self, id: u32) -> Result<UserHandle> {
        self.users.get(&id).cloned().ok_or(CotabError::UnknownUser(id))
    }

    /// Current display state of the tab for `id`, if it is open.
    pub fn display(&self, id: &str) -> Option<TabDisplayState> {
        self.tab(id).ok().map(|t| t.label.display())
    }

    /// Render every open tab's current state, one line per tab.
    pub fn snapshot(&self) -> Vec<String> {
        self.tabs
            .iter()
            .map(|t| {
                let d = t.label.display();
                format!(
                    "[{}] {} {} {} {}",
                    t.document.id(),
                    d.icon.as_str(),
                    d.title,
                    d.color.as_str(),
                    self.render_dots(&d.dots),
                )
            })
            .collect()
    }

    /// Apply one event and return the re-render requests it caused.
    pub fn apply(&mut self, event: &ScriptEvent) -> Result<Vec<String>> {
        match event {
            ScriptEvent::Status { document, status } => {
                self.tab(document)?.document.session().set_status(*status);
            }
            ScriptEvent::SubscriptionGroup { document, group } => {
                self.tab(document)?
                    .document
                    .session()
                    .set_subscription_group(group.clone().map(GroupId));
            }
            ScriptEvent::Editable { document, editable } => {
                self.tab(document)?.document.buffer().set_editable(*editable);
            }
            ScriptEvent::Modified { document, modified } => {
                self.tab(document)?.document.buffer().set_modified(*modified);
            }
            ScriptEvent::Edit {
                document,
                kind,
                author,
            } => {
                let author = author.map(|id| self.user(id)).transpose()?;
                self.tab(document)?.document.buffer().notify_edit(*kind, author);
            }
            ScriptEvent::Activate { document } => {
                if let Some(id) = document {
                    self.tab(id)?;
                }
                self.folder.switch_to(document.clone().map(DocumentId));
            }
            ScriptEvent::Hue { user, hue } => {
                self.user(*user)?.set_hue(*hue);
            }
            ScriptEvent::Close { document } => {
                let index = self
                    .tabs
                    .iter()
                    .position(|t| t.document.id().0 == *document)
                    .ok_or_else(|| CotabError::UnknownDocument(document.clone()))?;
                let mut tab = self.tabs.remove(index);
                let released = tab.label.close();
                if self.folder.is_current(tab.document.id()) {
                    self.folder.switch_to(None);
                }
                let mut lines = self.drain();
                lines.push(format!(
                    "[{document}] closed: released {} primary and {} hue subscriptions",
                    released.primary, released.hue
                ));
                return Ok(lines);
            }
        }
        Ok(self.drain())
    }

    /// Apply every event of `script` in order.  Returns the initial snapshot
    /// followed by the re-render requests of each event.
    pub fn run(script: &Script, config: Config) -> Result<Vec<String>> {
        let mut app = Self::new(script, config)?;
        app.drain();
        let mut out = app.snapshot();
        for event in &script.events {
            out.extend(app.apply(event)?);
        }
        info!(events = script.events.len(), tabs = app.tabs.len(), "replay finished");
        Ok(out)
    }

    fn drain(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for tab in &self.tabs {
            for event in tab.sink.take() {
                lines.push(format!("[{}] {}", tab.document.id(), self.render(&event)));
            }
        }
        lines
    }

    fn render(&self, event: &SinkEvent) -> String {
        match event {
            SinkEvent::Icon(icon) => format!("icon {}", icon.as_str()),
            SinkEvent::Title(title) => format!("title {title}"),
            SinkEvent::Color(class, rgb) => format!("color {} {rgb}", class.as_str()),
            SinkEvent::Dots(dots) => format!("dots {}", self.render_dots(dots)),
        }
    }

    fn render_dots(&self, dots: &[Dot]) -> String {
        if dots.is_empty() {
            return "-".to_owned();
        }
        dots.iter()
            .map(|d| format!("{}{}", self.config.dot_glyph, d.color))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
