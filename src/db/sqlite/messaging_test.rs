//! Tests for SqliteMessagingRepository.

use super::test_support::{seed_users, setup_db};
use crate::db::{Database, DbError, Message, MessagingRepository, PageSort};

fn make_message(conversation_id: &str, sender_id: &str, content: &str) -> Message {
    Message {
        id: String::new(),
        conversation_id: conversation_id.to_string(),
        sender_id: sender_id.to_string(),
        content: content.to_string(),
        created_at: String::new(),
        read_at: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn conversation_find_direct() {
    let db = setup_db().await;
    seed_users(&db, &["alice001", "bob00001", "carol001"]).await;
    let messaging = db.messaging();

    assert!(
        messaging
            .find_direct("alice001", "bob00001")
            .await
            .expect("Lookup should succeed")
            .is_none()
    );

    let created = messaging
        .create_conversation(&["bob00001".to_string(), "alice001".to_string()])
        .await
        .expect("Create should succeed");
    assert_eq!(created.participant_ids, vec!["alice001", "bob00001"]);

    // Either argument order finds it
    let found = messaging
        .find_direct("bob00001", "alice001")
        .await
        .expect("Lookup should succeed")
        .expect("Conversation should exist");
    assert_eq!(found.id, created.id);
    assert_eq!(found.participant_ids, vec!["alice001", "bob00001"]);

    assert!(
        messaging
            .find_direct("alice001", "carol001")
            .await
            .expect("Lookup should succeed")
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn messages_newest_first_with_pagination() {
    let db = setup_db().await;
    seed_users(&db, &["alice001", "bob00001"]).await;
    let messaging = db.messaging();

    let conversation = messaging
        .create_conversation(&["alice001".to_string(), "bob00001".to_string()])
        .await
        .expect("Create should succeed");

    for text in ["first", "second", "third"] {
        messaging
            .add_message(&make_message(&conversation.id, "alice001", text))
            .await
            .expect("Add message should succeed");
    }

    let all = messaging
        .list_messages(&conversation.id, &PageSort::default())
        .await
        .expect("List should succeed");
    let texts: Vec<&str> = all.items.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["third", "second", "first"]);
    assert_eq!(all.total, 3);

    let page = messaging
        .list_messages(
            &conversation.id,
            &PageSort {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("List should succeed");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].content, "second");
}

#[tokio::test(flavor = "multi_thread")]
async fn add_message_to_missing_conversation() {
    let db = setup_db().await;
    seed_users(&db, &["alice001"]).await;

    let result = db
        .messaging()
        .add_message(&make_message("nonexist", "alice001", "hello?"))
        .await;
    assert!(matches!(result, Err(DbError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn unread_counts_and_mark_read() {
    let db = setup_db().await;
    seed_users(&db, &["alice001", "bob00001", "carol001"]).await;
    let messaging = db.messaging();

    let ab = messaging
        .create_conversation(&["alice001".to_string(), "bob00001".to_string()])
        .await
        .expect("Create should succeed");
    let cb = messaging
        .create_conversation(&["carol001".to_string(), "bob00001".to_string()])
        .await
        .expect("Create should succeed");

    messaging
        .add_message(&make_message(&ab.id, "alice001", "hi bob"))
        .await
        .expect("Add message should succeed");
    messaging
        .add_message(&make_message(&ab.id, "alice001", "are you around?"))
        .await
        .expect("Add message should succeed");
    messaging
        .add_message(&make_message(&ab.id, "bob00001", "yes"))
        .await
        .expect("Add message should succeed");
    messaging
        .add_message(&make_message(&cb.id, "carol001", "collab?"))
        .await
        .expect("Add message should succeed");

    assert_eq!(messaging.unread_count("bob00001").await.expect("Count should succeed"), 3);
    assert_eq!(messaging.unread_count("alice001").await.expect("Count should succeed"), 1);

    let inbox = messaging
        .list_for_user("bob00001")
        .await
        .expect("Inbox should succeed");
    assert_eq!(inbox.len(), 2);
    let ab_summary = inbox
        .iter()
        .find(|s| s.conversation.id == ab.id)
        .expect("Conversation should be in inbox");
    assert_eq!(ab_summary.unread_count, 2);
    assert_eq!(
        ab_summary.last_message.as_ref().map(|m| m.content.as_str()),
        Some("yes")
    );

    let updated = messaging
        .mark_read(&ab.id, "bob00001")
        .await
        .expect("Mark read should succeed");
    assert_eq!(updated, 2);
    // Second call has nothing left to mark
    assert_eq!(
        messaging
            .mark_read(&ab.id, "bob00001")
            .await
            .expect("Mark read should succeed"),
        0
    );
    assert_eq!(messaging.unread_count("bob00001").await.expect("Count should succeed"), 1);
    // Bob's own message is still unread for Alice
    assert_eq!(messaging.unread_count("alice001").await.expect("Count should succeed"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn inbox_empty_conversation_has_no_last_message() {
    let db = setup_db().await;
    seed_users(&db, &["alice001", "bob00001"]).await;

    db.messaging()
        .create_conversation(&["alice001".to_string(), "bob00001".to_string()])
        .await
        .expect("Create should succeed");

    let inbox = db
        .messaging()
        .list_for_user("alice001")
        .await
        .expect("Inbox should succeed");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].unread_count, 0);
    assert!(inbox[0].last_message.is_none());
}
