//! Strongly-typed identifier for service records
//!
//! Displayed as `svc-` followed by the first eight hex digits of the UUID,
//! which is also accepted as a lookup prefix by the record service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const DISPLAY_PREFIX: &str = "svc-";

/// Identifier of a [`ServiceRecord`](super::ServiceRecord)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(Uuid);

impl ServiceId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short form used in listings, e.g. `svc-1a2b3c4d`
    pub fn short(&self) -> String {
        format!("{}{}", DISPLAY_PREFIX, &self.0.simple().to_string()[..8])
    }

    /// Whether `query` names this ID, either as a full UUID or as a
    /// (possibly `svc-`-prefixed) leading fragment of its hex form
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        let query = query.strip_prefix(DISPLAY_PREFIX).unwrap_or(&query);
        if query.is_empty() {
            return false;
        }
        self.0.to_string() == query || self.0.simple().to_string().starts_with(query)
    }
}

impl Default for ServiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

impl From<Uuid> for ServiceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for ServiceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(DISPLAY_PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}
