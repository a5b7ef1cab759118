// ── Recent editors ────────────────────────────────────────────────────────────
//
// Users who changed a document while its tab was in the background.  Each
// entry owns the subscription to that user's hue notifications; removing the
// entry (or dropping the set) releases it.

use crate::{
    signal::Subscription,
    ui::tabs::Dot,
    user::{UserHandle, UserId},
};

struct Entry {
    user: UserHandle,
    hue_watch: Subscription,
}

/// Insertion-ordered set of users, unique by `UserId`.
#[derive(Default)]
pub struct RecentEditorSet {
    entries: Vec<Entry>,
}

impl RecentEditorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.entries.iter().any(|e| e.user.id() == id)
    }

    /// Add `user` if not already present.  `watch` is only called for a new
    /// member; it must return the member's hue subscription.  Returns whether
    /// membership changed.
    pub fn insert_with(
        &mut self,
        user: &UserHandle,
        watch: impl FnOnce(&UserHandle) -> Subscription,
    ) -> bool {
        if self.contains(user.id()) {
            return false;
        }
        let hue_watch = watch(user);
        self.entries.push(Entry {
            user: UserHandle::clone(user),
            hue_watch,
        });
        true
    }

    /// Drop every member and release its hue subscription.  Returns the number
    /// of subscriptions released.
    pub fn clear(&mut self) -> usize {
        self.entries
            .drain(..)
            .map(|mut e| usize::from(e.hue_watch.disconnect()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Member ids in insertion order.
    pub fn ids(&self) -> Vec<UserId> {
        self.entries.iter().map(|e| e.user.id()).collect()
    }

    /// One dot per member, coloured by the member's current hue.
    pub fn dots(&self) -> Vec<Dot> {
        self.entries
            .iter()
            .map(|e| Dot::for_user(e.user.id(), e.user.hue()))
            .collect()
    }
}

impl std::fmt::Debug for RecentEditorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
