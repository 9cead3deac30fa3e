//! Core domain types and shared logic for the tally download-statistics cache.
//!
//! This crate defines the data model used across all other crates:
//! - Calendar-day statistics and the unavailable sentinel
//! - Package name rules
//! - Range reconciliation (which days to request next)
//! - Normalization of sparse upstream responses
//! - The clock capability and shared configuration

pub mod clock;
pub mod config;
pub mod day;
pub mod error;
pub mod normalize;
pub mod package;
pub mod range;

pub use clock::{Clock, FixedClock, SystemClock};
pub use day::{DailyStatistic, EPOCH, FetchRange, UNAVAILABLE};
pub use error::{Error, Result};
pub use normalize::{RangeResponse, normalize};
pub use package::{GLOBAL_PACKAGE, validate_package_name};
pub use range::{BACKLOG_EXHAUSTION_DAYS, RangeDecision, RangePolicy, decide_next_range};
