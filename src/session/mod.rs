// ── Collaborative session model ───────────────────────────────────────────────
//
// Observable view of the session that owns a shared document.  The real
// synchronisation machinery lives elsewhere; this type only carries the two
// facts the tab label reacts to (status and subscription group) and announces
// changes to them on a single notification stream.

use std::{
    cell::{Cell, RefCell},
    fmt,
};

use serde::{Deserialize, Serialize};

use crate::signal::{Signal, Subscription};

// ── Status ────────────────────────────────────────────────────────────────────

/// Lifecycle of a collaborative session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Initial document content is still being transferred.
    Synchronizing,
    /// Live; local and remote edits flow.
    Running,
    /// The session has ended.
    Closed,
}

impl SessionStatus {
    /// Short display string used in logs and replay output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synchronizing => "synchronizing",
            Self::Running => "running",
            Self::Closed => "closed",
        }
    }
}

/// Identifies the subscription group a session is connected through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

/// What changed on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Status,
    SubscriptionGroup,
}

// ── Session ───────────────────────────────────────────────────────────────────

pub struct Session {
    status: Cell<SessionStatus>,
    subscription_group: RefCell<Option<GroupId>>,
    changed: Signal<SessionChange>,
}

impl Session {
    /// A session that is still synchronising and not yet part of a group.
    pub fn new() -> Self {
        Self::with_state(SessionStatus::Synchronizing, None)
    }

    pub fn with_state(status: SessionStatus, subscription_group: Option<GroupId>) -> Self {
        Self {
            status: Cell::new(status),
            subscription_group: RefCell::new(subscription_group),
            changed: Signal::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status.get()
    }

    pub fn subscription_group(&self) -> Option<GroupId> {
        self.subscription_group.borrow().clone()
    }

    /// `false` once the subscription group is gone.
    pub fn is_subscribed(&self) -> bool {
        self.subscription_group.borrow().is_some()
    }

    pub fn set_status(&self, status: SessionStatus) {
        if self.status.replace(status) != status {
            self.changed.emit(&SessionChange::Status);
        }
    }

    pub fn set_subscription_group(&self, group: Option<GroupId>) {
        let changed = {
            let mut current = self.subscription_group.borrow_mut();
            if *current == group {
                false
            } else {
                *current = group;
                true
            }
        };
        if changed {
            self.changed.emit(&SessionChange::SubscriptionGroup);
        }
    }

    /// Subscribe to status and subscription-group changes.
    pub fn connect_changed(&self, handler: impl Fn(&SessionChange) + 'static) -> Subscription {
        self.changed.connect(handler)
    }

    pub fn watcher_count(&self) -> usize {
        self.changed.handler_count()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status.get())
            .field("subscription_group", &*self.subscription_group.borrow())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn new_session_is_synchronizing_and_unsubscribed() {
        let s = Session::new();
        assert_eq!(s.status(), SessionStatus::Synchronizing);
        assert!(!s.is_subscribed());
    }

    #[test]
    fn changes_are_reported_once() {
        let s = Session::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = s.connect_changed(move |c| log.borrow_mut().push(*c));

        s.set_status(SessionStatus::Running);
        s.set_status(SessionStatus::Running);
        s.set_subscription_group(Some(GroupId("g".into())));
        s.set_subscription_group(Some(GroupId("g".into())));
        s.set_subscription_group(None);

        assert_eq!(
            *seen.borrow(),
            vec![
                SessionChange::Status,
                SessionChange::SubscriptionGroup,
                SessionChange::SubscriptionGroup,
            ]
        );
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&SessionStatus::Synchronizing).expect("serialize");
        assert_eq!(json, "\"synchronizing\"");
    }
}
