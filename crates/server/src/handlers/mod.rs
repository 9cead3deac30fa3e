//! HTTP request handlers.

pub mod averages;
pub mod downloads;
pub mod health;

pub use averages::*;
pub use downloads::*;
pub use health::*;
