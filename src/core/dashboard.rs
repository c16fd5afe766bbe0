//! Live values from the portal dashboard.
//!
//! Independent of the chart sequence: one GET, one JSON body.

use serde::{Deserialize, Serialize};

use super::http;
use super::portal::PortalEndpoints;
use super::session::Session;
use crate::error::{Result, SunnyError};

/// Current power flows, in watts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(rename = "PV")]
    pub pv_watts: f64,
    #[serde(rename = "TotalConsumption")]
    pub total_consumption_watts: f64,
    #[serde(rename = "GridConsumption")]
    pub grid_consumption_watts: f64,
}

/// Outcome of a dashboard read.
///
/// Outside of live operating hours the portal answers with no usable body;
/// that is [`DashboardReading::Unavailable`], not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashboardReading {
    Live(DashboardSnapshot),
    Unavailable,
}

impl DashboardReading {
    /// Parse a dashboard response body.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Option<DashboardSnapshot>>(body) {
            Ok(Some(snapshot)) => Self::Live(snapshot),
            Ok(None) => Self::Unavailable,
            Err(e) => {
                tracing::debug!(error = %e, bytes = body.len(), "Dashboard body is not a snapshot");
                Self::Unavailable
            }
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> Option<&DashboardSnapshot> {
        match self {
            Self::Live(snapshot) => Some(snapshot),
            Self::Unavailable => None,
        }
    }
}

/// Reads the dashboard's live-values endpoint.
#[derive(Debug, Clone)]
pub struct DashboardReader {
    endpoints: PortalEndpoints,
}

impl DashboardReader {
    #[must_use]
    pub const fn new(endpoints: PortalEndpoints) -> Self {
        Self { endpoints }
    }

    /// Fetch the current values.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailure` for a non-success status and `Timeout`/`Network`
    /// for transport failures. A missing or unparseable body is not an error.
    pub async fn read(&self, session: &Session) -> Result<DashboardReading> {
        let mut url = self.endpoints.dashboard.clone();
        url.query_pairs_mut()
            .append_pair("t", &http::nonce().to_string());

        let request = session
            .client()
            .get(url.clone())
            .build()
            .map_err(|e| http::transport_error(url.as_str(), session.timeout(), &e))?;
        let followed = http::send_following(session.client(), request, session.timeout()).await?;

        let login_redirect = self.endpoints.is_login_page(followed.final_url());
        if !followed.status().is_success() || login_redirect {
            return Err(SunnyError::RequestFailure {
                url: self.endpoints.dashboard.to_string(),
                status: followed.status().as_u16(),
                login_redirect,
            });
        }

        let body = followed
            .response
            .bytes()
            .await
            .map_err(|e| http::transport_error(url.as_str(), session.timeout(), &e))?;
        Ok(DashboardReading::from_body(&body))
    }
}
