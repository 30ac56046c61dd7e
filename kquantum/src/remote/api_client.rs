//! Backend API client

use super::TokenManager;
use crate::context::AppContext;
use kquantum_di::Dc;
use std::time::Duration;

/// HTTP status that invalidates the stored token
const UNAUTHORIZED: u16 = 401;

/// Builds requests against the backend API.
///
/// Requests carry the stored token as a bearer credential; an unauthorized
/// response clears it.
#[derive(Debug)]
pub struct ApiClient {
    tokens: Dc<TokenManager>,
    base_url: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    log_bodies: bool,
}

impl ApiClient {
    /// Creates a client for the configured backend
    pub fn new(tokens: Dc<TokenManager>, context: Dc<AppContext>) -> Self {
        let config = context.config();
        Self {
            tokens,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
            log_bodies: config.debug,
        }
    }

    /// Returns the absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns the headers of the next request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(3);
        if let Some(token) = self.tokens.token() {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        headers.push(("Content-Type", "application/json".into()));
        headers.push(("Accept", "application/json".into()));
        headers
    }

    /// Reacts to the status of a response
    pub fn on_response(&self, status: u16) {
        if status == UNAUTHORIZED {
            tracing::debug!("unauthorized response, clearing the stored token");
            self.tokens.clear_token();
        }
    }

    /// Returns `(connect, read, write)` timeouts
    #[inline]
    pub fn timeouts(&self) -> (Duration, Duration, Duration) {
        (self.connect_timeout, self.read_timeout, self.write_timeout)
    }

    /// Returns `true` if request and response bodies are logged
    #[inline]
    pub fn logs_bodies(&self) -> bool {
        self.log_bodies
    }

    /// Returns the credential store used for requests
    #[inline]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }
}
