//! Change notification system for broadcasting updates to WebSocket clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Messages broadcast when entities are created, updated, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum UpdateMessage {
    // Teams
    TeamUpdated { team_id: String },
    TeamDeleted { team_id: String },

    // Content
    ContentCreated { content_id: String },
    ContentUpdated { content_id: String },
    ContentStatusChanged { content_id: String, status: String },
    ContentDeleted { content_id: String },

    // Approvals
    ApprovalSubmitted { approval_id: String, content_id: String },
    ApprovalDecided { approval_id: String, content_id: String, status: String },

    // Task assignments
    TaskCreated { task_id: String },
    TaskUpdated { task_id: String },
    TaskDeleted { task_id: String },

    // Messaging
    MessageSent { conversation_id: String, message_id: String },
    ConversationRead { conversation_id: String, user_id: String },

    // Collaboration
    CollaborationRequested { request_id: String },
    CollaborationUpdated { request_id: String, status: String },
    SharedProjectCreated { project_id: String },
    SharedProjectUpdated { project_id: String },
}

/// Pub/sub notifier for broadcasting changes to all subscribers.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<UpdateMessage>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    /// Create a new ChangeNotifier with a buffer of 100 messages.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(100);
        Self { tx }
    }

    /// Subscribe to receive update notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMessage> {
        self.tx.subscribe()
    }

    /// Broadcast an update message to all subscribers.
    pub fn notify(&self, msg: UpdateMessage) {
        let _ = self.tx.send(msg);
    }
}
