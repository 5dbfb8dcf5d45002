use serde_json::json;

use crate::cli::commands::inbox::*;
use crate::cli::commands::test_server::{client, post_json, register, spawn_test_server};

fn summary(participants: &[&str], unread: usize, last: Option<&str>) -> ConversationSummary {
    ConversationSummary {
        id: "c0000001".to_string(),
        participant_ids: participants.iter().map(|s| s.to_string()).collect(),
        created_at: "2025-06-01 09:00:00".to_string(),
        updated_at: "2025-06-01 09:30:00".to_string(),
        unread_count: unread,
        last_message: last.map(|content| Message {
            id: "m0000001".to_string(),
            conversation_id: "c0000001".to_string(),
            sender_id: participants[0].to_string(),
            content: content.to_string(),
            created_at: "2025-06-01 09:30:00".to_string(),
            read_at: None,
        }),
    }
}

#[test]
fn test_display_hides_viewer() {
    let row = ConversationDisplay::for_viewer(&summary(&["aaaa0001", "bbbb0002"], 2, Some("hey")), "aaaa0001");
    assert_eq!(row.with, "bbbb0002");
    assert_eq!(row.unread, 2);
    assert_eq!(row.last_message, "hey");
    assert_eq!(row.updated_at, "2025-06-01 09:30");
}

#[test]
fn test_display_without_messages() {
    let row = ConversationDisplay::for_viewer(&summary(&["aaaa0001", "bbbb0002"], 0, None), "bbbb0002");
    assert_eq!(row.with, "aaaa0001");
    assert_eq!(row.last_message, "-");
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[], "aaaa0001"), "No conversations found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inbox_flow() {
    let (url, _handle) = spawn_test_server().await;
    let ana = register(&url, "Ana").await;
    let ben = register(&url, "Ben").await;

    let conversation = post_json(
        &url,
        &ana,
        "/api/v1/conversations",
        json!({ "participant_id": ben }),
    )
    .await;
    let conversation_id = conversation["id"].as_str().unwrap().to_string();

    let ana_api = client(&url, &ana);
    let ben_api = client(&url, &ben);

    assert_eq!(unread(&ben_api).await.unwrap(), "No unread messages.");

    send(&ana_api, &conversation_id, "Collab on the hiking video?")
        .await
        .unwrap();
    send(&ana_api, &conversation_id, "Next weekend works")
        .await
        .unwrap();

    assert_eq!(unread(&ben_api).await.unwrap(), "2 unread messages");
    assert_eq!(unread(&ana_api).await.unwrap(), "No unread messages.");

    let table = list_conversations(&ben_api, "table").await.unwrap();
    assert!(table.contains(&ana));
    assert!(table.contains("Next weekend works"));

    let output = mark_read(&ben_api, &conversation_id).await.unwrap();
    assert_eq!(output, "✓ Marked 2 message(s) as read");
    assert_eq!(unread(&ben_api).await.unwrap(), "No unread messages.");

    let json = list_conversations(&ben_api, "json").await.unwrap();
    let conversations: Vec<ConversationSummary> = serde_json::from_str(&json).unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].unread_count, 0);
}
