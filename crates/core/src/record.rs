//! Record trait: identity plus self-validation.

use crate::error::DomainResult;

/// A table-backed record.
///
/// Records are plain data with public fields. `validate` performs the
/// checks a record can do on its own (codes, lengths, arithmetic between its
/// own fields); checks that need other records live in `full_test` methods
/// or in the infra services.
pub trait Record {
    /// Primary key type (a business code or a UUID newtype).
    type Key: Clone + Eq + core::fmt::Debug;

    /// Returns the primary key.
    fn key(&self) -> Self::Key;

    /// Checks that only need this record.
    fn validate(&self) -> DomainResult<()>;
}
