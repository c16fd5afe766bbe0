//! Ordered chart retrieval.
//!
//! The portal keeps per-session chart state, and every request in the
//! sequence conditions the next one. Skipping or reordering a step does not
//! fail loudly: the export just comes back empty or for the wrong window.
//!
//! The minimal known-working order is:
//!
//! 1. energy overview page (sets up the chart widget context)
//! 2. chart API without a range (cold priming call)
//! 3. chart API with `xf`/`xt`
//! 4. CSV export of the same chart
//!
//! Older portal revisions needed extra priming calls; [`ChartSequence`] is the
//! single place where those get inserted.


use chrono::{DateTime, NaiveDate, SubsecRound};
use chrono_tz::Tz;
use reqwest::Url;

use super::http;
use super::portal::{CHART_ID, EXPORT_TYPE, PortalEndpoints};
use super::session::Session;
use crate::error::{Result, SunnyError};
use crate::util::time::{REPORTING_TZ, local_midnight};

/// A chart window in the reporting timezone, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartQuery {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl ChartQuery {
    /// Build a window from two instants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `start` is after `end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        let start = start.with_timezone(&REPORTING_TZ).trunc_subsecs(0);
        let end = end.with_timezone(&REPORTING_TZ).trunc_subsecs(0);
        if start > end {
            return Err(SunnyError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Midnight of `day` to midnight of the following day.
    #[must_use]
    pub fn for_day(day: NaiveDate) -> Self {
        let next = day.succ_opt().unwrap_or(day);
        Self {
            start: local_midnight(day),
            end: local_midnight(next),
        }
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Tz> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Tz> {
        self.end
    }

    /// Calendar date of the window start.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Bytes returned by the export endpoint for one query, untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChartData {
    query: ChartQuery,
    bytes: Vec<u8>,
}

impl RawChartData {
    #[must_use]
    pub const fn new(query: ChartQuery, bytes: Vec<u8>) -> Self {
        Self { query, bytes }
    }

    #[must_use]
    pub const fn query(&self) -> &ChartQuery {
        &self.query
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// One request of the chart retrieval sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolStep {
    /// The energy overview page; establishes the chart widget's view context.
    EnergyOverview,
    /// Chart API without a time range.
    ColdChart,
    /// Chart API with the query window.
    RangedChart,
    /// Any additional priming GET whose response is discarded.
    Prime(Url),
    /// CSV export of the chart; its body is the result.
    ExportCsv,
}

impl ProtocolStep {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EnergyOverview => "energy_overview",
            Self::ColdChart => "cold_chart",
            Self::RangedChart => "ranged_chart",
            Self::Prime(_) => "prime",
            Self::ExportCsv => "export_csv",
        }
    }

    fn url(&self, endpoints: &PortalEndpoints) -> Url {
        match self {
            Self::EnergyOverview => endpoints.energy_overview.clone(),
            Self::ColdChart | Self::RangedChart => endpoints.chart_api.clone(),
            Self::Prime(url) => url.clone(),
            Self::ExportCsv => endpoints.chart_export.clone(),
        }
    }

    /// Query parameters that identify this step, excluding the nonce.
    fn params(&self, query: &ChartQuery) -> Vec<(&'static str, String)> {
        match self {
            Self::EnergyOverview | Self::Prime(_) => Vec::new(),
            Self::ColdChart => vec![("id", CHART_ID.to_string())],
            Self::RangedChart => vec![
                ("id", CHART_ID.to_string()),
                ("xf", query.start.timestamp().to_string()),
                ("xt", query.end.timestamp().to_string()),
            ],
            Self::ExportCsv => vec![
                ("down", EXPORT_TYPE.to_string()),
                ("chartId", CHART_ID.to_string()),
            ],
        }
    }

    /// The URL reported when this step fails: endpoint plus identifying params.
    fn display_url(&self, endpoints: &PortalEndpoints, query: &ChartQuery) -> String {
        let mut url = self.url(endpoints);
        let params = self.params(query);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url.to_string()
    }
}

/// The ordered list of requests that yields one CSV export.
///
/// Always ends with [`ProtocolStep::ExportCsv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSequence {
    steps: Vec<ProtocolStep>,
}

impl ChartSequence {
    /// Overview, cold chart, ranged chart, export.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            steps: vec![
                ProtocolStep::EnergyOverview,
                ProtocolStep::ColdChart,
                ProtocolStep::RangedChart,
                ProtocolStep::ExportCsv,
            ],
        }
    }

    /// Insert an extra priming GET right before the ranged chart request.
    #[must_use]
    pub fn with_priming(mut self, url: Url) -> Self {
        let at = self
            .steps
            .iter()
            .position(|step| *step == ProtocolStep::RangedChart)
            .unwrap_or(self.steps.len() - 1);
        self.steps.insert(at, ProtocolStep::Prime(url));
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[ProtocolStep] {
        &self.steps
    }
}

impl Default for ChartSequence {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Runs a [`ChartSequence`] against the portal with an authenticated session.
#[derive(Debug, Clone)]
pub struct PortalProtocolDriver {
    endpoints: PortalEndpoints,
    sequence: ChartSequence,
}

impl PortalProtocolDriver {
    #[must_use]
    pub fn new(endpoints: PortalEndpoints) -> Self {
        Self::with_sequence(endpoints, ChartSequence::baseline())
    }

    #[must_use]
    pub const fn with_sequence(endpoints: PortalEndpoints, sequence: ChartSequence) -> Self {
        Self {
            endpoints,
            sequence,
        }
    }

    #[must_use]
    pub const fn sequence(&self) -> &ChartSequence {
        &self.sequence
    }

    /// Retrieve the CSV export for `query`.
    ///
    /// Steps run strictly in order. The first step that answers with a
    /// non-success status, or whose redirects end on the login page, aborts
    /// the sequence; later steps are not sent.
    ///
    /// # Errors
    ///
    /// Returns `RequestFailure` naming the failing step's URL, or
    /// `Timeout`/`Network` for transport failures.
    pub async fn fetch_range(
        &self,
        session: &mut Session,
        query: &ChartQuery,
    ) -> Result<RawChartData> {
        let mut body = Vec::new();

        for step in self.sequence.steps() {
            let mut url = step.url(&self.endpoints);
            url.query_pairs_mut()
                .extend_pairs(step.params(query))
                .append_pair("t", &http::nonce().to_string());

            tracing::debug!(step = step.name(), %url, "Portal request");
            let request = session
                .client()
                .get(url.clone())
                .build()
                .map_err(|e| http::transport_error(url.as_str(), session.timeout(), &e))?;
            let followed =
                http::send_following(session.client(), request, session.timeout()).await?;

            let status = followed.status();
            let login_redirect = self.endpoints.is_login_page(followed.final_url());
            if !status.is_success() || login_redirect {
                tracing::warn!(
                    step = step.name(),
                    status = status.as_u16(),
                    login_redirect,
                    "Portal request failed"
                );
                return Err(SunnyError::RequestFailure {
                    url: step.display_url(&self.endpoints, query),
                    status: status.as_u16(),
                    login_redirect,
                });
            }

            body = followed
                .response
                .bytes()
                .await
                .map_err(|e| http::transport_error(url.as_str(), session.timeout(), &e))?
                .to_vec();
        }

        session.record_query();
        tracing::debug!(bytes = body.len(), day = %query.day(), "Chart export received");
        Ok(RawChartData::new(*query, body))
    }
}
