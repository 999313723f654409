//! Per-user session state.
//!
//! Two facts are remembered for each user: the last link they submitted and
//! the handle of their current progress message. State lives for the process
//! lifetime only; entries are overwritten in place and never evicted. Writes
//! are last-write-wins — two simultaneous submissions from the same user race
//! and the later one silently wins.
//!
//! Links are stored as the raw text the user sent; URL validation happens
//! when a download is actually attempted, not on submission.

use dashmap::DashMap;
use teloxide::types::{ChatId, MessageId, UserId};

/// Handle of the progress message currently being edited for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressHandle {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Debug, Clone, Default)]
struct UserSession {
    last_link: Option<String>,
    progress: Option<ProgressHandle>,
}

/// Repository of per-user sessions, shared across handlers.
///
/// Injected through `HandlerDeps` rather than held in module globals so tests
/// can construct their own instances.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<UserId, UserSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the last link a user submitted, replacing any previous one.
    pub fn set_link(&self, user: UserId, link: String) {
        self.sessions.entry(user).or_default().last_link = Some(link);
    }

    /// Returns the last link the user submitted, if any.
    pub fn link(&self, user: UserId) -> Option<String> {
        self.sessions.get(&user).and_then(|s| s.last_link.clone())
    }

    /// Remembers the progress message currently shown to a user.
    pub fn set_progress(&self, user: UserId, handle: ProgressHandle) {
        self.sessions.entry(user).or_default().progress = Some(handle);
    }

    /// Returns the user's current progress-message handle, if any.
    pub fn progress(&self, user: UserId) -> Option<ProgressHandle> {
        self.sessions.get(&user).and_then(|s| s.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_absent_initially() {
        let store = SessionStore::new();
        assert_eq!(store.link(UserId(1)), None);
        assert_eq!(store.progress(UserId(1)), None);
    }

    #[test]
    fn test_link_roundtrip_and_overwrite() {
        let store = SessionStore::new();
        let user = UserId(42);

        store.set_link(user, "https://example.com/a".to_string());
        assert_eq!(store.link(user).as_deref(), Some("https://example.com/a"));

        store.set_link(user, "https://example.com/b".to_string());
        assert_eq!(store.link(user).as_deref(), Some("https://example.com/b"));
    }

    #[test]
    fn test_sessions_are_per_user() {
        let store = SessionStore::new();
        store.set_link(UserId(1), "https://example.com/one".to_string());

        assert_eq!(store.link(UserId(2)), None);
    }

    #[test]
    fn test_progress_handle_overwrite() {
        let store = SessionStore::new();
        let user = UserId(7);
        let first = ProgressHandle {
            chat_id: ChatId(7),
            message_id: MessageId(100),
        };
        let second = ProgressHandle {
            chat_id: ChatId(7),
            message_id: MessageId(101),
        };

        store.set_progress(user, first);
        store.set_progress(user, second);
        assert_eq!(store.progress(user), Some(second));
    }

    #[test]
    fn test_link_survives_progress_update() {
        let store = SessionStore::new();
        let user = UserId(9);

        store.set_link(user, "https://example.com/v".to_string());
        store.set_progress(
            user,
            ProgressHandle {
                chat_id: ChatId(9),
                message_id: MessageId(5),
            },
        );

        assert_eq!(store.link(user).as_deref(), Some("https://example.com/v"));
    }
}
