pub mod auth;
pub mod babies;
pub mod chat;
pub mod sessions;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;

use nestling_client::{AuthApi, BabyApi, ChatApi, FileSessionStore, Gateway};

/// Shared command context: the session store plus the gateway stack.
pub struct Context {
    gateway: Arc<Gateway>,
}

impl Context {
    pub fn new(api_url: &str, install_expiry_hook: bool) -> Result<Self> {
        let store =
            Arc::new(FileSessionStore::open_default().context("failed to open session store")?);

        let mut gateway = Gateway::new(api_url, store);
        if install_expiry_hook {
            gateway = gateway.with_session_expired_hook(|| {
                eprintln!(
                    "{}",
                    "Session expired. Run `nestling login` to sign in again.".yellow()
                );
            });
        }

        Ok(Self {
            gateway: Arc::new(gateway),
        })
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.gateway.clone())
    }

    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.gateway.clone())
    }

    pub fn babies(&self) -> BabyApi {
        BabyApi::new(self.gateway.clone())
    }
}

pub(crate) fn prompt(label: &str) -> Result<String> {
    use std::io::Write;

    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
