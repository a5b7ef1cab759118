// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in cotab return `error::Result<T>`.  The tab-status
// controller itself never fails; errors come from the edges: configuration
// files, replay scripts, and the new-document command.

use thiserror::Error;

/// Every error that cotab can produce.
#[derive(Debug, Error)]
pub enum CotabError {
    /// A standard I/O error (config or script read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config or script file was not valid JSON for its schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A versioned file carried a version this build does not understand.
    #[error("unsupported {what} version {found} (expected {expected})")]
    UnsupportedVersion {
        /// `"config"` or `"script"`, for display purposes.
        what: &'static str,
        found: u32,
        expected: u32,
    },

    /// A colour string was not of the form `#rrggbb`.
    #[error("invalid colour {0:?}, expected #rrggbb")]
    InvalidColor(String),

    /// A replay event referenced a document that was never declared.
    #[error("unknown document {0:?}")]
    UnknownDocument(String),

    /// A replay event referenced a user that was never declared.
    #[error("unknown user {0}")]
    UnknownUser(u32),

    /// A replay script declared the same document id twice.
    #[error("document {0:?} declared more than once")]
    DuplicateDocument(String),

    /// A replay script declared the same user id twice.
    #[error("user {0} declared more than once")]
    DuplicateUser(u32),

    /// The new-document command was accepted with an empty name.
    #[error("document name must not be empty")]
    EmptyDocumentName,

    /// The new-document command was accepted without a target directory.
    #[error("no target directory selected")]
    NoDirectorySelected,

    /// The selected target node is a document, not a directory.
    #[error("node {0} is not a directory")]
    NotADirectory(u64),

    /// The selected directory lives in a different browser than the one the
    /// request was handed to.
    #[error("node {node} belongs to browser {owner}, not browser {given}")]
    WrongBrowser { node: u64, owner: u64, given: u64 },

    /// The node browser refused the create request.
    #[error("create request failed: {0}")]
    RequestFailed(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CotabError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
