//! Session semantics: last-write-wins link storage and progress handles.

use std::sync::Arc;

use grabbot::session::{ProgressHandle, SessionStore};
use teloxide::types::{ChatId, MessageId, UserId};

#[test]
fn link_overwrite_is_last_write_wins() {
    let store = SessionStore::new();
    let user = UserId(1000);

    store.set_link(user, "https://example.com/first".to_string());
    store.set_link(user, "https://example.com/second".to_string());

    assert_eq!(store.link(user).as_deref(), Some("https://example.com/second"));
}

#[test]
fn non_url_text_is_stored_verbatim() {
    // Links are unvalidated on submission; bad input fails at download time.
    let store = SessionStore::new();
    let user = UserId(2000);

    store.set_link(user, "not a url at all".to_string());
    assert_eq!(store.link(user).as_deref(), Some("not a url at all"));
}

#[test]
fn users_do_not_share_state() {
    let store = SessionStore::new();

    store.set_link(UserId(1), "https://example.com/a".to_string());
    store.set_progress(
        UserId(1),
        ProgressHandle {
            chat_id: ChatId(1),
            message_id: MessageId(10),
        },
    );

    assert_eq!(store.link(UserId(2)), None);
    assert_eq!(store.progress(UserId(2)), None);
}

#[tokio::test]
async fn concurrent_writers_leave_a_consistent_entry() {
    // No guard against same-user races is required; whichever write lands
    // last must win and the entry must never be torn.
    let store = Arc::new(SessionStore::new());
    let user = UserId(3000);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store.set_link(user, format!("https://example.com/{}", i));
            store.set_progress(
                user,
                ProgressHandle {
                    chat_id: ChatId(3000),
                    message_id: MessageId(i),
                },
            );
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let link = store.link(user).unwrap();
    assert!(link.starts_with("https://example.com/"));
    assert!(store.progress(user).is_some());
}
