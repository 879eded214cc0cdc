//! Streaming chat protocol client and chat endpoints.
//!
//! [`ChatApi::send_message_stream`] delivers the assistant's reply
//! incrementally as an ordered stream of [`ChatEvent`]s. Every failure
//! mode (connection setup, non-success status, transport error,
//! server-reported error frame) becomes an `Error` event; the stream
//! itself never fails.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use reqwest::StatusCode;

use nestling_models::chat::{
    ChatCompletion, ChatMessageRequest, ChatSession, ChatSessionDetail, FeedbackRequest,
    StreamFrame,
};
use nestling_models::error_detail::extract_detail;

use crate::error::Result;
use crate::gateway::Gateway;
use crate::sse::FrameDecoder;

/// Message endpoint of the streaming protocol.
const MESSAGE_PATH: &str = "/api/v1/chat/message";

/// Fixed message for an authorization failure at connection time.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
/// Fallback when a failure body carries no parseable detail.
const SEND_FAILED_MESSAGE: &str = "Failed to send message.";
/// Fallback for errors that carry no message of their own.
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error.";

/// One decoded event of a message exchange.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Partial assistant text, in arrival order.
    Fragment(String),
    /// The complete answer with its metadata and citations.
    Complete(ChatCompletion),
    /// Human-readable failure.
    Error(String),
}

pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Caller-supplied handlers for the three event kinds.
pub struct ChatCallbacks<'a> {
    pub on_fragment: Box<dyn FnMut(&str) + Send + 'a>,
    pub on_complete: Box<dyn FnMut(ChatCompletion) + Send + 'a>,
    pub on_error: Box<dyn FnMut(String) + Send + 'a>,
}

/// Chat endpoints: the streaming message exchange plus session CRUD and
/// feedback.
#[derive(Clone)]
pub struct ChatApi {
    gateway: Arc<Gateway>,
}

impl ChatApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Stream one message exchange as discrete events.
    ///
    /// Events are emitted strictly in byte-stream order; the stream ends
    /// when the connection closes. An absent credential is permitted;
    /// the request goes out unauthenticated.
    pub fn send_message_stream(&self, request: ChatMessageRequest) -> ChatEventStream {
        let gateway = self.gateway.clone();

        Box::pin(async_stream::stream! {
            let token = gateway.session().access_token();
            let mut builder = gateway
                .http()
                .post(gateway.endpoint(MESSAGE_PATH))
                .json(&request);
            if let Some(token) = &token {
                builder = builder.bearer_auth(token);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(err) => {
                    yield ChatEvent::Error(error_message(&err));
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                if status == StatusCode::UNAUTHORIZED {
                    yield ChatEvent::Error(SESSION_EXPIRED_MESSAGE.to_string());
                    return;
                }
                let body = response.text().await.unwrap_or_default();
                let message =
                    extract_detail(&body).unwrap_or_else(|| SEND_FAILED_MESSAGE.to_string());
                yield ChatEvent::Error(message);
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut decoder = FrameDecoder::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        yield ChatEvent::Error(error_message(&err));
                        return;
                    }
                };

                for frame in decoder.push(&chunk) {
                    match frame {
                        StreamFrame::Chunk { content } => yield ChatEvent::Fragment(content),
                        StreamFrame::Done(completion) => yield ChatEvent::Complete(completion),
                        // A server-reported error does not end the
                        // stream; only end-of-bytes does.
                        StreamFrame::Error { detail } => yield ChatEvent::Error(detail),
                    }
                }
            }
        })
    }

    /// Callback rendition of [`Self::send_message_stream`]: drives the
    /// exchange to completion, delivering every outcome through the
    /// handlers and never through a return value.
    pub async fn send_message_streaming(
        &self,
        request: ChatMessageRequest,
        mut callbacks: ChatCallbacks<'_>,
    ) {
        let mut events = self.send_message_stream(request);
        while let Some(event) = events.next().await {
            match event {
                ChatEvent::Fragment(text) => (callbacks.on_fragment)(&text),
                ChatEvent::Complete(completion) => (callbacks.on_complete)(completion),
                ChatEvent::Error(message) => (callbacks.on_error)(message),
            }
        }
    }

    pub async fn sessions(&self, baby_id: Option<&str>) -> Result<Vec<ChatSession>> {
        let path = match baby_id {
            Some(baby_id) => format!("/api/v1/chat/sessions?baby_id={baby_id}"),
            None => "/api/v1/chat/sessions".to_string(),
        };
        self.gateway.get_json(&path).await
    }

    pub async fn session_detail(&self, session_id: &str) -> Result<ChatSessionDetail> {
        self.gateway
            .get_json(&format!("/api/v1/chat/sessions/{session_id}"))
            .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.gateway
            .delete(&format!("/api/v1/chat/sessions/{session_id}"))
            .await
    }

    pub async fn send_feedback(&self, request: &FeedbackRequest) -> Result<()> {
        self.gateway.post("/api/v1/feedback", request).await
    }
}

fn error_message(err: &reqwest::Error) -> String {
    let message = err.to_string();
    if message.is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
