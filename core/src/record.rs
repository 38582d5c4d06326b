//! Records, their identities and the two sentinel ids.
//!
//! The reconciler never looks inside a record beyond its id. Everything it
//! needs from a concrete type is expressed by [`Record`]: how to build a
//! provisional row from an insert payload, how to merge an update payload
//! and, optionally, which single parent relation to resolve on creation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id given to a row whose creation has not been confirmed yet.
pub const OPTIMISTIC_ID: &str = "optimistic";

/// Id given to a row whose deletion has not been confirmed yet.
pub const DELETE_ID: &str = "delete";

/// Opaque string identity assigned by the persistence layer
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a `RecordId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The `"optimistic"` sentinel
    #[must_use]
    pub fn optimistic() -> Self {
        Self(OPTIMISTIC_ID.to_string())
    }

    /// The `"delete"` sentinel
    #[must_use]
    pub fn deleting() -> Self {
        Self(DELETE_ID.to_string())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `"optimistic"` sentinel
    #[must_use]
    pub fn is_optimistic(&self) -> bool {
        self.0 == OPTIMISTIC_ID
    }

    /// Whether this is the `"delete"` sentinel
    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.0 == DELETE_ID
    }

    /// Whether this is either sentinel
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.is_optimistic() || self.is_deleting()
    }

    /// Whether the id is empty after trimming
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Rendering status of a row, derived from its id alone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Row comes from the authoritative list
    Confirmed,
    /// Row is an unconfirmed creation
    Creating,
    /// Row is an unconfirmed deletion
    Deleting,
}

impl RowStatus {
    /// Derives the status from an id
    #[must_use]
    pub fn of(id: &RecordId) -> Self {
        if id.is_optimistic() {
            Self::Creating
        } else if id.is_deleting() {
            Self::Deleting
        } else {
            Self::Confirmed
        }
    }

    /// Whether the row should render with the transient treatment
    #[must_use]
    pub const fn is_pending(self) -> bool {
        !matches!(self, Self::Confirmed)
    }
}

/// Anything that carries a [`RecordId`]
pub trait Identified {
    /// The record's identity
    fn id(&self) -> &RecordId;
}

/// Parent type for records without a foreign-key relation
///
/// Uninhabited: a reference list of `Unrelated` is always empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unrelated {}

impl Identified for Unrelated {
    fn id(&self) -> &RecordId {
        match *self {}
    }
}

/// A domain entity the reconciler can render speculatively
///
/// # Type Parameters
///
/// - `Draft`: insert shape, carries no persisted id
/// - `Patch`: update shape, every field optional, merged over the old row
/// - `Parent`: the single relation resolved from a side-loaded list on create
pub trait Record: Identified + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Insert shape
    type Draft: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Update shape
    type Patch: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Related record resolved on creation
    type Parent: Identified + Clone + fmt::Debug + Send + Sync + 'static;

    /// Replaces the record's id
    fn set_id(&mut self, id: RecordId);

    /// Builds the row shown while a creation is in flight
    ///
    /// The id is overwritten with the `"optimistic"` sentinel afterwards,
    /// so implementations may put anything there.
    fn provisional(draft: Self::Draft) -> Self;

    /// Shallow merge: every field present in `patch` wins
    ///
    /// Must not touch the id.
    fn merge(&mut self, patch: Self::Patch);

    /// Foreign key of the parent relation, if any
    fn parent_id(_draft: &Self::Draft) -> Option<&RecordId> {
        None
    }

    /// Foreign key of the parent relation when a patch changes it
    fn patch_parent_id(_patch: &Self::Patch) -> Option<&RecordId> {
        None
    }

    /// Attaches a resolved parent to a provisional or patched row
    fn attach_parent(&mut self, _parent: Self::Parent) {}

    /// Rendering status derived from the id
    fn status(&self) -> RowStatus {
        RowStatus::of(self.id())
    }
}
