//! Record identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a record, backed by a random UUIDv4
///
/// Records are opaque handles looked up by exact id; they are never sorted
/// by identifier, so the random v4 variant is sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(uuid::Uuid);

impl RecordId {
    /// Generate a fresh random RecordId
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Parse a RecordId from its canonical string form
    ///
    /// # Examples
    ///
    /// ```
    /// use dossier_domain::RecordId;
    ///
    /// let id = RecordId::new();
    /// let parsed = RecordId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid record id: {}", e))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
