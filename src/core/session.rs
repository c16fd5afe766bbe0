//! Authenticated portal sessions.
//!
//! The portal has no token API. A session is a cookie jar that went through
//! the identity provider's redirect handshake:
//!
//! 1. GET the login entry page and find the login form's `action` URL.
//! 2. POST the credentials there. Success always redirects; no redirect means
//!    the credentials were rejected.
//! 3. POST the query parameters of the final redirect back to that URL's base
//!    to finalize the exchange.
//!
//! Renewal is simply another [`AuthSession::login`]; the old [`Session`] is dropped.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};

use super::html::find_element_attribute;
use super::http::{self, FollowedResponse};
use super::portal::{LOGIN_FORM_NAME, PortalEndpoints};
use crate::error::{AuthStage, Result, SunnyError};

/// Portal login credentials.
///
/// Both fields are secrets: neither is logged and `Debug` redacts them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn form(&self) -> [(&'static str, &str); 3] {
        [
            ("username", &self.username),
            ("password", &self.password),
            ("credentialId", ""),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated client handle.
///
/// A session is *fresh* until it has served its first chart query, and *aged*
/// afterwards. It is owned by exactly one component at a time; every request
/// goes through `&mut Session` or `&Session` borrows, never a shared clone.
#[derive(Debug)]
pub struct Session {
    client: Client,
    timeout: Duration,
    established_at: DateTime<Utc>,
    queries_served: u32,
}

impl Session {
    fn new(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            established_at: Utc::now(),
            queries_served: 0,
        }
    }

    /// The cookie-bearing HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Timeout applied to every request made with this session.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// When the handshake that produced this session completed.
    #[must_use]
    pub const fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }

    /// Number of chart queries this session has served.
    #[must_use]
    pub const fn queries_served(&self) -> u32 {
        self.queries_served
    }

    /// True until the first chart query completes.
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        self.queries_served == 0
    }

    pub(crate) fn record_query(&mut self) {
        self.queries_served += 1;
    }
}

/// Performs the login handshake against one portal.
#[derive(Debug, Clone)]
pub struct AuthSession {
    endpoints: PortalEndpoints,
    timeout: Duration,
}

impl AuthSession {
    #[must_use]
    pub const fn new(endpoints: PortalEndpoints, timeout: Duration) -> Self {
        Self { endpoints, timeout }
    }

    #[must_use]
    pub const fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    /// Log in and return a fresh session.
    ///
    /// # Errors
    ///
    /// - `Authentication { stage: Fetch }` if the login page returns a non-success status
    /// - `Authentication { stage: FormNotFound }` if the page has no usable login form
    /// - `Authentication { stage: Rejected }` if submitting credentials did not redirect
    /// - `Authentication { stage: Finalize }` if the callback POST did not return 200
    /// - `Timeout` / `Network` for transport failures at any step
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let client = http::build_client(self.timeout)?;
        tracing::debug!(
            login_host = ?self.endpoints.login_entry.host_str(),
            "Starting login handshake"
        );

        let action = self.discover_form_action(&client).await?;

        let request = client
            .post(action.clone())
            .form(&credentials.form())
            .build()
            .map_err(|e| http::transport_error(action.as_str(), self.timeout, &e))?;
        let submitted = http::send_following(&client, request, self.timeout).await?;
        if !submitted.was_redirected() {
            tracing::debug!(
                status = submitted.status().as_u16(),
                "Credential submission was not redirected"
            );
            return Err(SunnyError::Authentication {
                stage: AuthStage::Rejected,
                status: Some(submitted.status().as_u16()),
            });
        }
        tracing::debug!(hops = submitted.history.len(), "Credentials accepted");

        self.finalize(&client, submitted).await?;

        tracing::info!("Login successful");
        Ok(Session::new(client, self.timeout))
    }

    async fn discover_form_action(&self, client: &Client) -> Result<Url> {
        let entry = self.endpoints.login_entry.clone();
        let request = client
            .get(entry.clone())
            .build()
            .map_err(|e| http::transport_error(entry.as_str(), self.timeout, &e))?;
        let page = http::send_following(client, request, self.timeout).await?;

        if !page.status().is_success() {
            return Err(SunnyError::Authentication {
                stage: AuthStage::Fetch,
                status: Some(page.status().as_u16()),
            });
        }

        let page_url = page.final_url().clone();
        let body = page
            .response
            .text()
            .await
            .map_err(|e| http::transport_error(page_url.as_str(), self.timeout, &e))?;

        let action = find_element_attribute(&body, "form", ("name", LOGIN_FORM_NAME), "action")
            .filter(|action| !action.trim().is_empty())
            .ok_or(SunnyError::auth(AuthStage::FormNotFound))?;

        page_url
            .join(action.trim())
            .map_err(|_| SunnyError::auth(AuthStage::FormNotFound))
    }

    /// POST the callback's query parameters back to the callback's base URL.
    async fn finalize(&self, client: &Client, submitted: FollowedResponse) -> Result<()> {
        let callback = submitted.final_url().clone();
        let params: Vec<(String, String)> = callback.query_pairs().into_owned().collect();

        let mut base = callback;
        base.set_query(None);
        base.set_fragment(None);

        let request = client
            .post(base.clone())
            .form(&params)
            .build()
            .map_err(|e| http::transport_error(base.as_str(), self.timeout, &e))?;
        let finalized = http::send_following(client, request, self.timeout).await?;

        if finalized.status() != reqwest::StatusCode::OK {
            return Err(SunnyError::Authentication {
                stage: AuthStage::Finalize,
                status: Some(finalized.status().as_u16()),
            });
        }
        Ok(())
    }
}
