//! Integration tests for the Academy API.
//!
//! The tests in `tests/` talk to a running server over HTTP and are marked
//! `#[ignore]`, so a plain `cargo test` skips them.
//!
//! # Running Tests
//!
//! ```bash
//! academy-cli migrate
//! academy-cli user create -e admin@academy.test -n Admin -r admin --password 'integration-pass'
//! cargo run -p academy-server &
//!
//! ACADEMY_TEST_EMAIL=admin@academy.test ACADEMY_TEST_PASSWORD=integration-pass \
//!     cargo test -p academy-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ACADEMY_BASE_URL` - Server under test (default: `http://localhost:4000`)
//! - `ACADEMY_TEST_EMAIL` / `ACADEMY_TEST_PASSWORD` - Admin credentials for write tests

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("ACADEMY_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:4000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Absolute URL for an `/api` path.
#[must_use]
pub fn api_url(path: &str) -> String {
    format!("{}/api{path}", base_url())
}

/// A unique, slug-safe suffix so parallel runs never collide.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(12).collect()
}

/// HTTP client plus an optional bearer token.
pub struct TestContext {
    pub client: Client,
    pub token: Option<String>,
}

impl TestContext {
    /// Anonymous context.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn anonymous() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            token: None,
        }
    }

    /// Context logged in with `ACADEMY_TEST_EMAIL` / `ACADEMY_TEST_PASSWORD`.
    ///
    /// # Panics
    ///
    /// Panics if the credentials are missing or the login fails.
    #[allow(clippy::expect_used)]
    pub async fn admin() -> Self {
        let email = std::env::var("ACADEMY_TEST_EMAIL").expect("ACADEMY_TEST_EMAIL not set");
        let password =
            std::env::var("ACADEMY_TEST_PASSWORD").expect("ACADEMY_TEST_PASSWORD not set");

        let mut ctx = Self::anonymous();
        let resp = ctx
            .client
            .post(api_url("/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(resp.status(), StatusCode::OK, "login should succeed");

        let body: Value = resp.json().await.expect("Login response is not JSON");
        ctx.token = body["token"].as_str().map(str::to_owned);
        assert!(ctx.token.is_some(), "login response has no token");
        ctx
    }

    /// Attach the bearer token, if any.
    #[must_use]
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    #[must_use]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(api_url(path)))
    }

    #[must_use]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(api_url(path)))
    }

    #[must_use]
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.put(api_url(path)))
    }

    #[must_use]
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.patch(api_url(path)))
    }

    #[must_use]
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.delete(api_url(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_suffix_is_slug_safe() {
        let suffix = unique_suffix();
        assert_eq!(suffix.len(), 12);
        assert!(suffix.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(suffix, unique_suffix());
    }

    #[test]
    fn test_api_url_joins_path() {
        assert!(api_url("/posts").ends_with("/api/posts"));
    }
}
