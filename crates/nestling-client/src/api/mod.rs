//! Typed wrappers over the gateway for the Nestling REST API.
//!
//! Chat endpoints live with the streaming client in [`crate::chat`].

mod auth;
mod baby;

pub use auth::AuthApi;
pub use baby::BabyApi;
