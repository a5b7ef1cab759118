// ── Replay script ─────────────────────────────────────────────────────────────
//
// JSON description of a set of open documents, the collaborators around
// them, and a sequence of events to play against their models.  Used by the
// `cotab` binary to exercise tab labels without a GUI.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    buffer::EditKind,
    error::{CotabError, Result},
    session::SessionStatus,
};

const SCRIPT_VERSION: u32 = 1;

// ── On-disk types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub version: u32,
    pub documents: Vec<DocumentSpec>,
    #[serde(default)]
    pub users: Vec<UserSpec>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

/// Initial state of one open document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub id: String,
    pub title: String,
    #[serde(default = "default_status")]
    pub status: SessionStatus,
    /// `None` starts the document disconnected.
    #[serde(default)]
    pub subscription_group: Option<String>,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSpec {
    pub id: u32,
    pub name: String,
    pub hue: f64,
}

/// One step of the replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    Status {
        document: String,
        status: SessionStatus,
    },
    SubscriptionGroup {
        document: String,
        group: Option<String>,
    },
    Editable {
        document: String,
        editable: bool,
    },
    Modified {
        document: String,
        modified: bool,
    },
    /// A remote insert/erase; `author` absent means unattributed.
    Edit {
        document: String,
        kind: EditKind,
        #[serde(default)]
        author: Option<u32>,
    },
    /// Focus a document, or nothing when `document` is absent.
    Activate {
        #[serde(default)]
        document: Option<String>,
    },
    Hue {
        user: u32,
        hue: f64,
    },
    Close {
        document: String,
    },
}

fn default_status() -> SessionStatus {
    SessionStatus::Running
}

fn default_true() -> bool {
    true
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self> {
        let script: Script = serde_json::from_str(json)?;
        if script.version != SCRIPT_VERSION {
            return Err(CotabError::UnsupportedVersion {
                what: "script",
                found: script.version,
                expected: SCRIPT_VERSION,
            });
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
