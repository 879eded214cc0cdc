//! Chat sessions, messages, and the streaming wire protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub user_id: String,
    pub baby_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub is_active: bool,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: Option<u64>,
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Retrieval citation attached to an assistant answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSource {
    pub doc_id: String,
    pub chunk_index: u32,
    pub score: f64,
    pub filename: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    pub is_emergency: bool,
    #[serde(default)]
    pub rag_sources: Vec<RagSource>,
    #[serde(default)]
    pub qna_sources: Vec<RagSource>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionDetail {
    #[serde(flatten)]
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
}

/// Outbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub baby_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Final payload of a streamed answer, carried by the `done` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub session_id: String,
    pub response: String,
    pub is_emergency: bool,
    #[serde(default)]
    pub rag_sources: Vec<RagSource>,
    #[serde(default)]
    pub qna_sources: Vec<RagSource>,
    #[serde(default)]
    pub response_time: Option<f64>,
}

/// One event of the streaming response body.
///
/// The wire form is a `data: {json}` line per event, events separated by
/// a blank line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Partial assistant text.
    Chunk { content: String },
    /// Terminal frame carrying the complete answer.
    Done(ChatCompletion),
    /// Server-reported failure.
    Error { detail: String },
}

/// Message feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub message_id: String,
    pub score: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
