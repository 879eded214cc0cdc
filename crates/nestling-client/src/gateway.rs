//! Authenticated request gateway.
//!
//! Every REST call goes through [`Gateway`]: it attaches the bearer
//! credential and, on an authorization failure, coordinates one shared
//! refresh across all concurrent callers, replaying each failed request
//! once with the fresh token. A failed refresh is terminal: the session
//! is wiped and the registered session-expired hook runs.

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use nestling_models::error_detail::extract_detail;

use crate::error::{ClientError, RefreshError, Result};
use crate::http_client::build_http_client;
use crate::refresh::{RefreshCoordinator, RefreshTicket};
use crate::session::SessionStore;

/// Path of the refresh call, recognized in the interceptor so refresh
/// can never trigger itself.
pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Longest error-body slice surfaced when the payload is unstructured.
const MAX_ERROR_BODY: usize = 512;

type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

#[derive(serde::Deserialize)]
struct RefreshResponse {
    access_token: String,
}

pub struct Gateway {
    base_url: String,
    http: Client,
    session: Arc<dyn SessionStore>,
    refresh: RefreshCoordinator,
    on_session_expired: Option<SessionExpiredHook>,
}

impl Gateway {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: build_http_client(),
            session,
            refresh: RefreshCoordinator::new(),
            on_session_expired: None,
        }
    }

    /// Register a hook invoked once when a refresh fails terminally and
    /// the session has been wiped. UI collaborators route this to their
    /// sign-in entry point.
    pub fn with_session_expired_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// POST where the caller does not care about the response body.
    pub async fn post(&self, path: &str, body: &impl Serialize) -> Result<()> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// Issue a request with the current credential, refreshing and
    /// replaying once on an authorization failure.
    ///
    /// An absent credential is not an error here; the request simply
    /// goes out anonymously.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response> {
        let token = self.session.access_token();
        let response = self
            .send(method.clone(), path, body.as_ref(), token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        // Refresh cannot refresh itself.
        if path.contains(REFRESH_PATH) {
            return check_status(response).await;
        }

        tracing::debug!(%method, path, "authorization failure, entering refresh");

        let token = match self.refresh.begin().await {
            RefreshTicket::Leader => {
                let outcome = self.run_refresh().await;
                self.refresh.finish(outcome.clone()).await;
                match outcome {
                    Ok(token) => token,
                    Err(err) => {
                        self.expire_session();
                        return Err(err.into());
                    }
                }
            }
            RefreshTicket::Follower(pending) => match pending.await {
                Ok(Ok(token)) => token,
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => return Err(RefreshError::new("refresh was abandoned").into()),
            },
        };

        // Replay once with the fresh credential. The replay is not
        // re-intercepted: a second authorization failure surfaces as an
        // ordinary error.
        let replay = self.send(method, path, body.as_ref(), Some(&token)).await?;
        check_status(replay).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response> {
        let mut request = self.http.request(method, self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Perform the refresh call. It relies on the durable refresh cookie,
    /// not the expired bearer token, so no authorization header goes out.
    async fn run_refresh(&self) -> std::result::Result<String, RefreshError> {
        tracing::info!("refreshing access token");
        let response = self
            .http
            .post(self.endpoint(REFRESH_PATH))
            .send()
            .await
            .map_err(|err| RefreshError::new(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = extract_detail(&body)
                .unwrap_or_else(|| format!("refresh rejected with status {status}"));
            tracing::warn!(%status, "token refresh failed");
            return Err(RefreshError::new(message));
        }

        let payload: RefreshResponse = response
            .json()
            .await
            .map_err(|err| RefreshError::new(err.to_string()))?;

        // Keeps the stored user record, if any, next to the new token.
        self.session.set_access_token(payload.access_token.clone());
        tracing::info!("access token refreshed");
        Ok(payload.access_token)
    }

    fn expire_session(&self) {
        self.session.clear();
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }
}

/// Pass successes through; collapse failures into an `Api` error with a
/// normalized display message.
async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(response_to_error(response).await)
}

pub(crate) async fn response_to_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = extract_detail(&body).unwrap_or_else(|| fallback_message(status, &body));
    ClientError::Api { status, message }
}

fn fallback_message(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("request failed with status {status}");
    }
    // Truncate to avoid surfacing large or sensitive responses.
    if body.len() > MAX_ERROR_BODY {
        format!("{}... [truncated]", &body[..MAX_ERROR_BODY])
    } else {
        body.to_string()
    }
}
