//! sunny-scrape - SMA Sunny Portal scraper
//!
//! Logs in to the Sunny Portal, downloads per-day energy CSV exports and
//! reads live power values from the dashboard.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod core;
pub mod error;
pub mod render;
pub mod storage;
pub mod util;

pub use error::{ExitCode, Result, SunnyError};
