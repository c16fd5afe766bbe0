//! Per-day output files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::protocol::RawChartData;
use crate::error::{Result, SunnyError};

/// Receives each retrieved day as soon as it arrives.
pub trait OutputSink {
    /// Persist `data` for `day` and return where it went.
    ///
    /// # Errors
    ///
    /// Returns `OutputWrite` if the data could not be stored.
    fn write_day(&mut self, day: NaiveDate, data: &RawChartData) -> Result<PathBuf>;
}

/// File name for one day's export.
#[must_use]
pub fn day_file_name(day: NaiveDate) -> String {
    format!("sma_energy_data_{}.csv", day.format("%Y-%m-%d"))
}

/// Writes one CSV file per day into a directory.
#[derive(Debug, Clone)]
pub struct CsvDirectorySink {
    dir: PathBuf,
}

impl CsvDirectorySink {
    /// Use `dir` as the output directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `OutputWrite` if `dir` exists but is not a directory, or
    /// cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() && !dir.is_dir() {
            return Err(SunnyError::OutputWrite {
                source: std::io::Error::other("path exists but is not a directory"),
                path: dir,
            });
        }
        fs::create_dir_all(&dir).map_err(|source| SunnyError::OutputWrite {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputSink for CsvDirectorySink {
    fn write_day(&mut self, day: NaiveDate, data: &RawChartData) -> Result<PathBuf> {
        let path = self.dir.join(day_file_name(day));
        fs::write(&path, data.as_bytes()).map_err(|source| SunnyError::OutputWrite {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Energy data written");
        Ok(path)
    }
}
