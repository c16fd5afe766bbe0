//! HTTP client utilities.
//!
//! Provides the cookie-carrying client every portal request goes through, and
//! a redirect follower that keeps the redirect history visible to callers.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Request, Response, StatusCode, Url};

use crate::error::{Result, SunnyError};

/// Default timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of redirects followed for a single request.
pub const MAX_REDIRECTS: usize = 10;

/// The portal serves different markup to unknown agents, so identify as a desktop browser.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Build a configured HTTP client.
///
/// The client keeps cookies across requests and never follows redirects on
/// its own; use [`send_following`] for that.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .map_err(|e| SunnyError::Network {
            url: String::new(),
            message: e.to_string(),
        })
}

/// Milliseconds since the Unix epoch, used as a cache-defeating query value.
#[must_use]
pub fn nonce() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

/// Map a transport error for `url` to a [`SunnyError`].
#[must_use]
pub fn transport_error(url: &str, timeout: Duration, err: &reqwest::Error) -> SunnyError {
    if err.is_timeout() {
        SunnyError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        SunnyError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// A response reached after following zero or more redirects.
#[derive(Debug)]
pub struct FollowedResponse {
    /// The final, non-redirect response.
    pub response: Response,
    /// URLs that answered with a redirect, in the order they were visited.
    pub history: Vec<Url>,
}

impl FollowedResponse {
    /// Whether at least one redirect happened on the way.
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.history.is_empty()
    }

    /// Status of the final response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// URL of the final response.
    #[must_use]
    pub fn final_url(&self) -> &Url {
        self.response.url()
    }
}

/// Send `request` and follow redirects by hand, recording each hop.
///
/// 301, 302 and 303 continue with a GET to the new location (browser
/// semantics); 307 and 308 replay the original request. Cookies set by each
/// hop land in the client's cookie store.
///
/// # Errors
///
/// Returns `Timeout`/`Network` for transport failures and `TooManyRedirects`
/// when the chain is longer than [`MAX_REDIRECTS`].
pub async fn send_following(
    client: &Client,
    request: Request,
    timeout: Duration,
) -> Result<FollowedResponse> {
    let origin = request.url().to_string();
    let mut history = Vec::new();
    let mut next = request;

    loop {
        let replay = next.try_clone();
        let url = next.url().to_string();
        let response = client
            .execute(next)
            .await
            .map_err(|e| transport_error(&url, timeout, &e))?;

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| response.url().join(value).ok());

        let Some(target) = location.filter(|_| status.is_redirection()) else {
            return Ok(FollowedResponse { response, history });
        };

        if history.len() >= MAX_REDIRECTS {
            return Err(SunnyError::TooManyRedirects { url: origin });
        }

        tracing::trace!(
            from = %response.url(),
            to = %target,
            status = status.as_u16(),
            "Following redirect"
        );
        history.push(response.url().clone());

        next = match (status, replay) {
            (StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT, Some(mut again)) => {
                *again.url_mut() = target;
                again
            }
            _ => client
                .get(target.clone())
                .build()
                .map_err(|e| transport_error(target.as_str(), timeout, &e))?,
        };
    }
}
