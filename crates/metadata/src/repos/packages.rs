//! Package registry repository.

use crate::error::MetadataResult;
use crate::models::PackageRow;
use async_trait::async_trait;

/// Repository for the package registry.
#[async_trait]
pub trait PackageRepo: Send + Sync {
    /// Get a package by exact name.
    async fn get_package_by_name(&self, name: &str) -> MetadataResult<Option<PackageRow>>;

    /// Get a package by name, inserting it first if absent.
    ///
    /// Concurrent callers racing on a new name all observe the same row.
    async fn resolve_package(&self, name: &str) -> MetadataResult<PackageRow>;
}
