//! Supporting types for the resource lifecycle: request tokens, the
//! sequencer that orders responses, notifications and the edit surface.

use crate::validation::ValidationError;
use chrono::{DateTime, Utc};
use optimistic_core::{OptimisticAction, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Monotonically increasing number attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Wraps a raw token value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw token value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a mutation's token is remembered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PendingKey {
    Record(RecordId),
    Create(RequestToken),
}

/// Orders responses that may resolve out of order
///
/// Mutations are keyed by the record they target; each create is its own
/// key. Only the latest token issued for a key is current. Reads form a
/// single stream: a read result is accepted only when it was issued after
/// the last accepted read.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    next: u64,
    latest: HashMap<PendingKey, RequestToken>,
    last_read: Option<RequestToken>,
}

impl RequestSequencer {
    /// An empty sequencer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> RequestToken {
        self.next += 1;
        RequestToken(self.next)
    }

    fn key(target: Option<&RecordId>, token: RequestToken) -> PendingKey {
        target.map_or(PendingKey::Create(token), |id| PendingKey::Record(id.clone()))
    }

    /// Issues a token for a mutation on `target` (`None` for creates)
    pub fn begin(&mut self, target: Option<&RecordId>) -> RequestToken {
        let token = self.allocate();
        self.latest.insert(Self::key(target, token), token);
        token
    }

    /// Settles a mutation response; `true` when `token` is still the latest
    /// for its key
    pub fn finish(&mut self, target: Option<&RecordId>, token: RequestToken) -> bool {
        let key = Self::key(target, token);
        if self.latest.get(&key) == Some(&token) {
            self.latest.remove(&key);
            true
        } else {
            false
        }
    }

    /// Issues a token for a list read
    pub fn begin_read(&mut self) -> RequestToken {
        self.allocate()
    }

    /// Accepts a read result unless a later read was already applied
    pub fn accept_read(&mut self, token: RequestToken) -> bool {
        if self.last_read.is_some_and(|last| last >= token) {
            return false;
        }
        self.last_read = Some(token);
        true
    }

    /// Mutations whose latest response has not arrived
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.latest.len()
    }
}

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// The mutation was persisted
    Success,
    /// The mutation or a read failed
    Error,
}

/// A toast shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Headline, e.g. `Event created!`
    pub title: String,
    /// Detail, the error message for failures
    pub description: Option<String>,
    /// When it was raised
    pub at: DateTime<Utc>,
}

impl Notification {
    /// A success notification
    #[must_use]
    pub fn success(title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: None,
            at,
        }
    }

    /// An error notification
    #[must_use]
    pub fn error(title: impl Into<String>, description: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: Some(description.into()),
            at,
        }
    }
}

/// The create/edit modal
#[derive(Debug, Clone, PartialEq)]
pub enum EditSurface<R: Record> {
    /// Not shown
    Closed,
    /// Shown, optionally pre-filled
    Open {
        /// The mutation the form holds, `None` for a blank form
        attempted: Option<OptimisticAction<R>>,
        /// Field errors from the last submit
        errors: Option<ValidationError>,
    },
}

impl<R: Record> EditSurface<R> {
    /// Whether the surface is shown
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Field errors from the last submit, if any
    #[must_use]
    pub const fn errors(&self) -> Option<&ValidationError> {
        match self {
            Self::Open { errors, .. } => errors.as_ref(),
            Self::Closed => None,
        }
    }

    /// The mutation the form is pre-filled with
    #[must_use]
    pub const fn attempted(&self) -> Option<&OptimisticAction<R>> {
        match self {
            Self::Open { attempted, .. } => attempted.as_ref(),
            Self::Closed => None,
        }
    }
}

impl<R: Record> Default for EditSurface<R> {
    fn default() -> Self {
        Self::Closed
    }
}
