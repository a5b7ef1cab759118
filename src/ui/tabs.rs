// ── Tab status derivation ─────────────────────────────────────────────────────
//
// Pure rule tables that turn the current session/buffer facts into what a tab
// label shows.  No signals, no state: `ui::label` calls these every time one
// of their inputs changes, so the result can never drift from the inputs.

use crate::{
    session::SessionStatus,
    theme::{presence_color, Rgb, ThemeProvider},
    user::UserId,
};

// ── Icon ──────────────────────────────────────────────────────────────────────

/// Status icon shown at the start of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    /// No subscription group: the document is not connected.
    Disconnected,
    /// Initial content is still being transferred.
    Syncing,
    /// Running and the local view accepts input.
    Editable,
    /// Running but the local view is read-only.
    ReadOnly,
    /// The session was closed.
    Stopped,
}

impl IconKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Syncing => "syncing",
            Self::Editable => "editable",
            Self::ReadOnly => "read-only",
            Self::Stopped => "stopped",
        }
    }
}

/// Icon for the given inputs.  `editable` only matters while running.
pub fn derive_icon(subscribed: bool, status: SessionStatus, editable: bool) -> IconKind {
    if !subscribed {
        return IconKind::Disconnected;
    }
    match status {
        SessionStatus::Synchronizing => IconKind::Syncing,
        SessionStatus::Running if editable => IconKind::Editable,
        SessionStatus::Running => IconKind::ReadOnly,
        SessionStatus::Closed => IconKind::Stopped,
    }
}

// ── Title colour ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    /// Changed by others since the tab was last focused.
    Alert,
    /// Not connected, or not (yet) running.
    Dim,
    Default,
}

impl ColorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Dim => "dim",
            Self::Default => "default",
        }
    }

    pub fn resolve(self, theme: &dyn ThemeProvider) -> Rgb {
        match self {
            Self::Alert => theme.alert_foreground(),
            Self::Dim => theme.dim_foreground(),
            Self::Default => theme.default_foreground(),
        }
    }
}

/// Colour class for the given inputs.  `changed` wins over everything else.
pub fn derive_color(changed: bool, subscribed: bool, status: SessionStatus) -> ColorClass {
    if changed {
        ColorClass::Alert
    } else if !subscribed || status != SessionStatus::Running {
        ColorClass::Dim
    } else {
        ColorClass::Default
    }
}

// ── Title ─────────────────────────────────────────────────────────────────────

/// Tab title: `name`, prefixed with `marker` when locally modified.
///
/// While synchronising the buffer reports spurious modifications, so the
/// marker is suppressed in that state.
///
/// | Status | Modified | Title |
/// |---|---|---|
/// | any but Synchronizing | no  | `"notes.txt"` |
/// | any but Synchronizing | yes | `"*notes.txt"` |
/// | Synchronizing         | any | `"notes.txt"` |
pub fn derive_title(name: &str, marker: &str, modified: bool, status: SessionStatus) -> String {
    if modified && status != SessionStatus::Synchronizing {
        format!("{marker}{name}")
    } else {
        name.to_owned()
    }
}

// ── Presence dots ─────────────────────────────────────────────────────────────

/// One rendered "changed by" glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot {
    pub user: UserId,
    pub color: Rgb,
}

impl Dot {
    pub fn for_user(user: UserId, hue: f64) -> Self {
        Self {
            user,
            color: presence_color(hue),
        }
    }
}

/// Everything a host needs to draw one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDisplayState {
    pub icon: IconKind,
    pub color: ColorClass,
    pub color_rgb: Rgb,
    pub title: String,
    /// Empty means the dot strip is hidden.
    pub dots: Vec<Dot>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
