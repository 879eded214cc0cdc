//! Shared wire types for the Nestling backend API.
//!
//! Everything here mirrors the JSON the backend speaks: accounts and
//! auth payloads, baby profiles, chat sessions, the streaming frame
//! protocol, and the error-detail shapes.

pub mod baby;
pub mod chat;
pub mod error_detail;
pub mod user;

// Re-export commonly used types
pub use baby::{Baby, BabyCreateRequest, BabyUpdateRequest};
pub use chat::{
    ChatCompletion, ChatMessage, ChatMessageRequest, ChatSession, ChatSessionDetail,
    FeedbackRequest, MessageRole, RagSource, StreamFrame,
};
pub use error_detail::{ErrorBody, ErrorDetail, FieldError};
pub use user::{AuthResponse, LoginRequest, SignupRequest, User};
