//! Package name rules.

use crate::error::{Error, Result};

/// Name of the pseudo-package aggregating downloads across all packages.
pub const GLOBAL_PACKAGE: &str = "";

/// Longest name the npm registry accepts.
pub const MAX_PACKAGE_NAME_LEN: usize = 214;

/// Check that a name is usable as a package key.
///
/// The empty name is valid and denotes the global aggregate. A `/` is only
/// allowed as the separator of a scoped name (`@scope/name`), so every
/// accepted name maps to exactly one upstream series.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.len() > MAX_PACKAGE_NAME_LEN {
        return Err(Error::InvalidPackageName(format!(
            "name is {} bytes long (max {MAX_PACKAGE_NAME_LEN})",
            name.len()
        )));
    }
    if name.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(Error::InvalidPackageName(format!(
            "name contains whitespace or control characters: {name:?}"
        )));
    }
    if let Some((scope, rest)) = name.split_once('/') {
        let scoped = scope.len() > 1 && scope.starts_with('@') && !rest.is_empty();
        if !scoped || rest.contains('/') {
            return Err(Error::InvalidPackageName(format!(
                "only scoped names (@scope/name) may contain '/': {name:?}"
            )));
        }
    }
    Ok(())
}

/// Whether a name denotes the global aggregate.
pub fn is_global(name: &str) -> bool {
    name == GLOBAL_PACKAGE
}
