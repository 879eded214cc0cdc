//! Nestling client core.
//!
//! This crate provides:
//! - Authenticated request gateway with transparent token refresh
//! - Streaming chat protocol client
//! - Durable session storage
//! - Typed wrappers for the Nestling REST API

pub mod api;
pub mod chat;
pub mod error;
pub mod gateway;
mod http_client;
mod refresh;
pub mod session;
pub mod sse;

// Re-export commonly used types
pub use api::{AuthApi, BabyApi};
pub use chat::{ChatApi, ChatCallbacks, ChatEvent, ChatEventStream};
pub use error::{ClientError, RefreshError, Result};
pub use gateway::{Gateway, REFRESH_PATH};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use sse::FrameDecoder;
