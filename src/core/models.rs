//! Command result payloads and the robot-mode envelope.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dashboard::DashboardReading;
use super::scheduler::{BatchOutcome, DayArtifact, RetrievalJob};

/// Envelope for every JSON document written to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,

    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self::with_errors(command, data, Vec::new())
    }

    /// Create with errors.
    pub fn with_errors(command: impl Into<String>, data: T, errors: Vec<String>) -> Self {
        Self {
            schema_version: "sunny-scrape.v1".to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
            errors,
        }
    }
}

/// Result of `current`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPayload {
    /// False outside of live operating hours.
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pv_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_consumption_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_consumption_watts: Option<f64>,
}

impl From<&DashboardReading> for CurrentPayload {
    fn from(reading: &DashboardReading) -> Self {
        let snapshot = reading.snapshot();
        Self {
            available: snapshot.is_some(),
            pv_watts: snapshot.map(|s| s.pv_watts),
            total_consumption_watts: snapshot.map(|s| s.total_consumption_watts),
            grid_consumption_watts: snapshot.map(|s| s.grid_consumption_watts),
        }
    }
}

/// Result of `history`, possibly partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPayload {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: Vec<DayArtifact>,
    pub renewals: u32,
    pub complete: bool,
    /// The day the batch stopped on, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_day: Option<NaiveDate>,
}

impl HistoryPayload {
    #[must_use]
    pub fn from_outcome(job: &RetrievalJob, outcome: &BatchOutcome) -> Self {
        Self {
            from: job.from(),
            to: job.to(),
            days: outcome.produced.clone(),
            renewals: outcome.renewals,
            complete: outcome.is_complete(),
            failed_day: outcome.failure.as_ref().map(|failure| failure.day),
        }
    }
}
