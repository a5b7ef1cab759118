// ── New shared document ───────────────────────────────────────────────────────
//
// "File → New" asks for a document name and a target directory in the
// shared document tree, then asks the directory browser to create a text
// node there.  The command object is created once and re-presented for every
// "New", like the dialog it backs.

use std::fmt;

use tracing::{debug, info};

use crate::error::{CotabError, Result};

/// Name the command is preset to every time it is presented.
pub const DEFAULT_DOCUMENT_NAME: &str = "New Document";

/// Plugin used for plain-text documents.
pub const TEXT_PLUGIN: &str = "InfText";

/// Identifier of one connected directory browser (one per server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserId(pub u64);

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a node in a remote document directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node as selected in the host's directory view, together with the
/// browser that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub browser: BrowserId,
    pub id: NodeId,
    pub is_directory: bool,
}

impl NodeRef {
    pub fn directory(browser: BrowserId, id: u64) -> Self {
        Self {
            browser,
            id: NodeId(id),
            is_directory: true,
        }
    }

    pub fn document(browser: BrowserId, id: u64) -> Self {
        Self {
            browser,
            id: NodeId(id),
            is_directory: false,
        }
    }
}

/// Handle of an in-flight create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

/// The directory service a create request goes to.
pub trait NodeBrowser {
    fn id(&self) -> BrowserId;

    /// Ask for a new leaf node `name` of type `plugin` under `parent`.
    fn add_note(
        &mut self,
        parent: NodeId,
        name: &str,
        plugin: &str,
    ) -> std::result::Result<RequestId, String>;
}

// ── Command ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocumentCommand {
    name: String,
    directory: Option<NodeRef>,
}

impl NewDocumentCommand {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_DOCUMENT_NAME.to_owned(),
            directory: None,
        }
    }

    /// Reset the name for a fresh "New".  The directory selection survives,
    /// as a tree view keeps its selection between presentations.
    pub fn present(&mut self) {
        self.name = DEFAULT_DOCUMENT_NAME.to_owned();
    }

    pub fn document_name(&self) -> &str {
        &self.name
    }

    pub fn set_document_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn selected_directory(&self) -> Option<NodeRef> {
        self.directory
    }

    pub fn select_directory(&mut self, node: Option<NodeRef>) {
        self.directory = node;
    }

    /// Whether `accept` would get past validation.
    pub fn can_accept(&self) -> bool {
        self.validate().is_ok()
    }

    fn validate(&self) -> Result<NodeRef> {
        if self.name.trim().is_empty() {
            return Err(CotabError::EmptyDocumentName);
        }
        let node = self.directory.ok_or(CotabError::NoDirectorySelected)?;
        if !node.is_directory {
            return Err(CotabError::NotADirectory(node.id.0));
        }
        Ok(node)
    }

    /// Validate the inputs and send the create request to the browser that
    /// owns the selected directory.
    pub fn accept(&mut self, browser: &mut dyn NodeBrowser) -> Result<RequestId> {
        let node = self.validate()?;
        if browser.id() != node.browser {
            return Err(CotabError::WrongBrowser {
                node: node.id.0,
                owner: node.browser.0,
                given: browser.id().0,
            });
        }
        let parent = node.id;
        debug!(browser = %node.browser, parent = %parent, name = %self.name, "requesting new document");
        let request = browser
            .add_note(parent, &self.name, TEXT_PLUGIN)
            .map_err(CotabError::RequestFailed)?;
        info!(parent = %parent, name = %self.name, "new document requested");
        Ok(request)
    }

    /// Dismiss without creating anything.
    pub fn cancel(&mut self) {
        debug!("new document cancelled");
    }
}

impl Default for NewDocumentCommand {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
