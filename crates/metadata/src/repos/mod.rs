//! Repository traits for metadata operations.

pub mod packages;
pub mod statistics;

pub use packages::PackageRepo;
pub use statistics::StatisticRepo;
