//! Multi-day retrieval with proactive session renewal.
//!
//! Portal sessions die under sustained batch load, so the scheduler logs in
//! again after a fixed number of day queries instead of waiting for a failure.
//! The run is fail-fast: the first failing day ends it, and every day written
//! before that stays on disk.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use super::protocol::{ChartQuery, PortalProtocolDriver};
use super::session::{AuthSession, Credentials, Session};
use crate::error::{Result, SunnyError};
use crate::storage::output::OutputSink;
use crate::util::time;

/// Renew after this many day queries unless configured otherwise.
pub const DEFAULT_RENEWAL_THRESHOLD: u32 = 30;

/// An inclusive range of calendar days to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalJob {
    from: NaiveDate,
    to: NaiveDate,
}

impl RetrievalJob {
    /// # Errors
    ///
    /// Returns `InvalidRange` if `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(SunnyError::InvalidRange {
                start: from.to_string(),
                end: to.to_string(),
            });
        }
        Ok(Self { from, to })
    }

    #[must_use]
    pub const fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// January 1st through December 31st of `year`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for years chrono cannot represent.
    pub fn full_year(year: i32) -> Result<Self> {
        let invalid = || SunnyError::InvalidRange {
            start: format!("{year}-01-01"),
            end: format!("{year}-12-31"),
        };
        let from = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
        Ok(Self { from, to })
    }

    /// Today in the portal's reporting timezone.
    #[must_use]
    pub fn today() -> Self {
        Self::single_day(time::today())
    }

    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// Every day of the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let to = self.to;
        self.from.iter_days().take_while(move |day| *day <= to)
    }

    /// Number of days in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from((self.to - self.from).num_days() + 1).unwrap_or(0)
    }

    /// Always false; a job covers at least one day.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// When to replace a session during a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    threshold: u32,
}

impl RenewalPolicy {
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for a threshold of zero.
    pub fn new(threshold: u32) -> Result<Self> {
        if threshold == 0 {
            return Err(SunnyError::ConfigInvalid {
                key: "batch.renewal_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self { threshold })
    }

    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether a session that served `queries` day queries must be replaced.
    #[must_use]
    pub const fn is_due(&self, queries: u32) -> bool {
        queries >= self.threshold
    }
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RENEWAL_THRESHOLD,
        }
    }
}

/// One day that made it to the output sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayArtifact {
    pub day: NaiveDate,
    pub path: PathBuf,
}

/// The day a batch stopped on, and why.
#[derive(Debug)]
pub struct DayFailure {
    pub day: NaiveDate,
    pub error: SunnyError,
}

/// Everything a batch run produced, including how it ended.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Days written before the run ended, in order.
    pub produced: Vec<DayArtifact>,
    /// Number of proactive logins performed.
    pub renewals: u32,
    /// The session in use at the end; `None` only if a renewal failed.
    pub session: Option<Session>,
    /// Set if the run stopped early.
    pub failure: Option<DayFailure>,
}

impl BatchOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Split into the produced days and the surviving session, or the terminal error.
    ///
    /// # Errors
    ///
    /// Returns the failure wrapped with its day as `DayFailed`.
    pub fn into_result(self) -> Result<(Vec<DayArtifact>, Session)> {
        match (self.failure, self.session) {
            (Some(DayFailure { day, error }), _) => Err(error.on_day(day)),
            (None, Some(session)) => Ok((self.produced, session)),
            (None, None) => Err(SunnyError::Io(std::io::Error::other(
                "batch ended without a session",
            ))),
        }
    }
}

/// Drives the protocol once per day and renews the session as it ages.
#[derive(Debug)]
pub struct BatchRetrievalScheduler<'a> {
    auth: &'a AuthSession,
    credentials: &'a Credentials,
    driver: &'a PortalProtocolDriver,
    policy: RenewalPolicy,
}

impl<'a> BatchRetrievalScheduler<'a> {
    #[must_use]
    pub const fn new(
        auth: &'a AuthSession,
        credentials: &'a Credentials,
        driver: &'a PortalProtocolDriver,
        policy: RenewalPolicy,
    ) -> Self {
        Self {
            auth,
            credentials,
            driver,
            policy,
        }
    }

    /// Retrieve every day of `job` into `sink`.
    ///
    /// Takes ownership of `session` for the whole run and hands back whichever
    /// session is current at the end. No renewal happens after the last day.
    pub async fn run(
        &self,
        job: &RetrievalJob,
        session: Session,
        sink: &mut dyn OutputSink,
    ) -> BatchOutcome {
        let mut session = session;
        let mut produced = Vec::with_capacity(job.len());
        let mut renewals = 0;

        tracing::info!(from = %job.from(), to = %job.to(), days = job.len(), "Starting batch");

        for day in job.days() {
            let query = ChartQuery::for_day(day);
            tracing::info!(
                %day,
                start = %query.start(),
                end = %query.end(),
                "Retrieving energy data"
            );

            let written = match self.driver.fetch_range(&mut session, &query).await {
                Ok(data) => sink.write_day(day, &data),
                Err(error) => Err(error),
            };

            match written {
                Ok(path) => produced.push(DayArtifact { day, path }),
                Err(error) => {
                    tracing::error!(%day, error = %error, "Batch aborted");
                    return BatchOutcome {
                        produced,
                        renewals,
                        session: Some(session),
                        failure: Some(DayFailure { day, error }),
                    };
                }
            }

            let more_days = day < job.to();
            if more_days && self.policy.is_due(session.queries_served()) {
                tracing::info!(served = session.queries_served(), "Renewing login session");
                match self.auth.login(self.credentials).await {
                    Ok(fresh) => {
                        session = fresh;
                        renewals += 1;
                    }
                    Err(error) => {
                        let next = day.succ_opt().unwrap_or(day);
                        tracing::error!(day = %next, error = %error, "Session renewal failed");
                        return BatchOutcome {
                            produced,
                            renewals,
                            session: None,
                            failure: Some(DayFailure { day: next, error }),
                        };
                    }
                }
            }
        }

        tracing::info!(days = produced.len(), renewals, "Batch complete");
        BatchOutcome {
            produced,
            renewals,
            session: Some(session),
            failure: None,
        }
    }
}
