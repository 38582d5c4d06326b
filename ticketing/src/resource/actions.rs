//! Actions for the resource lifecycle.

use super::types::RequestToken;
use crate::persistence::PersistenceError;
use crate::records::Resource;
use optimistic_core::{OptimisticAction, RecordId};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Commands sent by the UI and events fed back by effects
#[derive(Clone, Debug)]
pub enum ResourceAction<R: Resource> {
    // Commands
    /// Re-read the authoritative list
    Load,

    /// Re-read the side-loaded parent list
    LoadReferences,

    /// Replace the list with rows already at hand
    Seed {
        /// New authoritative rows
        rows: Vec<R>,
    },

    /// Insert a row
    Create {
        /// Insert payload
        params: R::Draft,
    },

    /// Patch a row
    Update {
        /// Target row
        id: RecordId,
        /// Fields to change
        params: R::Patch,
    },

    /// Remove a row
    Delete {
        /// Target row
        id: RecordId,
    },

    /// Submit an already-decoded optimistic action
    Submit {
        /// The mutation
        action: OptimisticAction<R>,
    },

    /// Show the edit surface, optionally pre-filled
    OpenEditor {
        /// Pre-filled mutation
        attempted: Option<OptimisticAction<R>>,
    },

    /// Hide the edit surface
    CloseEditor,

    /// Clear notifications
    DismissNotifications,

    /// The UI followed the navigation target
    Navigated,

    // Events
    /// A list read resolved
    Reseeded {
        /// Authoritative rows
        rows: Vec<R>,
        /// Token the read was issued with
        token: RequestToken,
    },

    /// A list read failed
    LoadFailed {
        /// Why
        error: PersistenceError,
        /// Token the read was issued with
        token: RequestToken,
    },

    /// The parent list resolved
    ReferencesLoaded {
        /// Candidate parents
        references: Vec<R::Parent>,
    },

    /// The parent list could not be read
    ReferencesFailed {
        /// Why
        error: PersistenceError,
    },

    /// Persistence accepted a mutation
    MutationSucceeded {
        /// The mutation as submitted
        mutation: OptimisticAction<R>,
        /// Token the request was issued with
        token: RequestToken,
    },

    /// Persistence rejected a mutation
    MutationFailed {
        /// The mutation as submitted
        mutation: OptimisticAction<R>,
        /// Why
        error: PersistenceError,
        /// Token the request was issued with
        token: RequestToken,
    },
}

impl<R> ResourceAction<R>
where
    R: Resource,
    R::Draft: DeserializeOwned,
    R::Patch: DeserializeOwned,
{
    /// A `Submit` command from the `{ action, data }` wire form
    #[must_use]
    pub fn from_wire(value: Value) -> Self {
        Self::Submit {
            action: OptimisticAction::from_json(value),
        }
    }
}
