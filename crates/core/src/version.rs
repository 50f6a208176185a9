//! Row versioning for optimistic concurrency.

use crate::error::{DomainError, DomainResult};

/// A stored record whose writes are guarded by a monotonically increasing version.
///
/// The store bumps the version by one on every committed write; readers hand the
/// version they saw back to the store as an [`ExpectedVersion`].
pub trait Versioned {
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a versioned row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the row to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_mismatch_is_a_conflict() {
        assert!(ExpectedVersion::Exact(3).check(3).is_ok());
        let err = ExpectedVersion::Exact(3).check(4).unwrap_err();
        assert!(err.is_retryable());
        assert!(ExpectedVersion::Any.matches(42));
    }
}
