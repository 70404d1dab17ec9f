//! Download module for page downloading.
//!
//! This module provides:
//! - The download driver (login, catalog, expiry-aware page loop)
//! - Download state tracking
//! - The clock session freshness is judged against

pub mod clock;
pub mod driver;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use driver::{DownloadDriver, DriverOptions};
pub use state::DownloadState;
