//! Strongly-typed migration file name wrapper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Width of the ledger's `filename` column (`char(120)`), in characters.
pub const MAX_MIGRATION_NAME_LEN: usize = 120;

/// File name of a migration, e.g. `1700000000_add_users.sql`.
///
/// This is the key recorded in the ledger, so it is kept apart from paths and
/// arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationName(String);

impl MigrationName {
    /// Create a new `MigrationName`, panicking in debug builds if the name is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        debug_assert!(!s.is_empty(), "MigrationName must not be empty");
        Self(s)
    }

    /// Try to create a new `MigrationName`, returning `None` if the name is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading decimal digits before the first `_`, if any.
    ///
    /// `1700000000_add_users.sql` yields `Some(1700000000)`.
    pub fn timestamp_prefix(&self) -> Option<u64> {
        let (prefix, _) = self.0.split_once('_')?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for MigrationName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}
