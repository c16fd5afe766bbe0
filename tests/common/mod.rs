//! Shared helpers for integration tests.
//!
//! - `portal`: wiremock mock of the Sunny Portal and its login flow
//! - `logger`: structured test progress output
//! - `log_capture`: tracing capture for asserting on emitted logs

pub mod log_capture;
pub mod logger;
pub mod portal;
