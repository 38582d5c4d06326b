//! Value objects shared by the ticketing records.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an authenticated user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `UserId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Statuses
// ============================================================================

/// Publication status of an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Listed in the public events listing
    Public,
    /// Only visible to its owner
    #[default]
    Unpublic,
}

impl EventStatus {
    /// The other status
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Public => Self::Unpublic,
            Self::Unpublic => Self::Public,
        }
    }

    /// Whether the event appears in the public listing
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    /// Stored form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unpublic => "unpublic",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status every ticket starts with
pub const TICKET_STATUS_CREATED: &str = "created";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_status_toggles_both_ways() {
        assert_eq!(EventStatus::Public.toggled(), EventStatus::Unpublic);
        assert_eq!(EventStatus::Unpublic.toggled(), EventStatus::Public);
        assert_eq!(EventStatus::default(), EventStatus::Unpublic);
    }

    #[test]
    fn event_status_wire_form() {
        assert_eq!(serde_json::to_string(&EventStatus::Public).ok().as_deref(), Some("\"public\""));
        let parsed: Option<EventStatus> = serde_json::from_str("\"unpublic\"").ok();
        assert_eq!(parsed, Some(EventStatus::Unpublic));
    }
}
