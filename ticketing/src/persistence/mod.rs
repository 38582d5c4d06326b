//! Persistence contract.
//!
//! The resource reducer talks to storage only through [`Repository`] and
//! [`ReferenceSource`]. [`memory::MemoryDatabase`] implements both for every
//! record and backs the tests and the demo binary.

pub mod memory;

use crate::auth::Principal;
use crate::records::{CheckInSection, Event, GroupOfTicket, Resource};
use async_trait::async_trait;
use optimistic_core::{RecordId, Unrelated};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryDatabase;

/// Message shown when a failure carries no text of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "Error, please try again.";

/// Errors returned by persistence calls
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistenceError {
    /// No row with this id (for owned rows: no row with this id for the principal)
    #[error("{resource} {id} not found")]
    NotFound {
        /// Record kind
        resource: String,
        /// Requested id
        id: RecordId,
    },

    /// The row exists but belongs to another user
    #[error("{resource} {id} belongs to another user")]
    Forbidden {
        /// Record kind
        resource: String,
        /// Requested id
        id: RecordId,
    },

    /// A constraint was violated, such as a missing parent row
    #[error("{0}")]
    Constraint(String),

    /// Storage could not be reached
    #[error("{0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Creates a [`PersistenceError::NotFound`] for resource `R`
    #[must_use]
    pub fn not_found<R: Resource>(id: &RecordId) -> Self {
        Self::NotFound {
            resource: R::NAME.to_string(),
            id: id.clone(),
        }
    }

    /// Creates a [`PersistenceError::Forbidden`] for resource `R`
    #[must_use]
    pub fn forbidden<R: Resource>(id: &RecordId) -> Self {
        Self::Forbidden {
            resource: R::NAME.to_string(),
            id: id.clone(),
        }
    }

    /// Text for the error notification
    #[must_use]
    pub fn user_message(&self) -> String {
        error_message(&self.to_string())
    }
}

/// `message`, or the generic fallback when it is blank
#[must_use]
pub fn error_message(message: &str) -> String {
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

/// CRUD access to one record kind
///
/// Every call carries the acting principal. Owned records (organizers,
/// events, tickets) are scoped to it: `list` returns only the principal's
/// rows and `update`/`delete` match on id and owner.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Inserts a row and returns it as stored
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Constraint`] if the parent row does not exist.
    async fn create(&self, principal: &Principal, params: R::Draft) -> Result<R, PersistenceError>;

    /// Applies a patch and returns the row as stored
    ///
    /// # Errors
    ///
    /// [`PersistenceError::NotFound`] or [`PersistenceError::Forbidden`].
    async fn update(
        &self,
        principal: &Principal,
        id: &RecordId,
        params: R::Patch,
    ) -> Result<R, PersistenceError>;

    /// Removes a row, cascading to its children, and returns it
    ///
    /// # Errors
    ///
    /// [`PersistenceError::NotFound`] or [`PersistenceError::Forbidden`].
    async fn delete(&self, principal: &Principal, id: &RecordId) -> Result<R, PersistenceError>;

    /// The authoritative list, in insertion order, parents joined
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Unavailable`] if storage cannot be read.
    async fn list(&self, principal: &Principal) -> Result<Vec<R>, PersistenceError>;

    /// One row by id, `None` when missing or not visible to the principal
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Unavailable`] if storage cannot be read.
    async fn get(&self, principal: &Principal, id: &RecordId) -> Result<Option<R>, PersistenceError>;
}

/// Side-loaded list of parent rows used to resolve relations on create
#[async_trait]
pub trait ReferenceSource<P>: Send + Sync {
    /// Loads the candidate parents
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Unavailable`] if storage cannot be read.
    async fn load(&self, principal: &Principal) -> Result<Vec<P>, PersistenceError>;
}

#[async_trait]
impl<P, T> ReferenceSource<P> for T
where
    P: Resource,
    T: Repository<P>,
{
    async fn load(&self, principal: &Principal) -> Result<Vec<P>, PersistenceError> {
        self.list(principal).await
    }
}

/// Reference source for records without a parent relation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReferences;

#[async_trait]
impl ReferenceSource<Unrelated> for NoReferences {
    async fn load(&self, _principal: &Principal) -> Result<Vec<Unrelated>, PersistenceError> {
        Ok(Vec::new())
    }
}

/// An event with everything hanging off it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    /// The event itself, organizer joined
    pub event: Event,
    /// Its groups of tickets, without the event joined
    pub group_of_tickets: Vec<GroupOfTicket>,
    /// Its check-in sections, without the event joined
    pub check_in_sections: Vec<CheckInSection>,
}

/// Event queries beyond plain CRUD
#[async_trait]
pub trait EventQueries: Send + Sync {
    /// Every public event regardless of owner, organizer joined
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Unavailable`] if storage cannot be read.
    async fn list_public(&self, principal: &Principal) -> Result<Vec<Event>, PersistenceError>;

    /// The event with its groups of tickets and check-in sections
    ///
    /// Not owner-scoped: any signed-in principal may read the detail page.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Unavailable`] if storage cannot be read.
    async fn event_with_children(
        &self,
        principal: &Principal,
        id: &RecordId,
    ) -> Result<Option<EventDetail>, PersistenceError>;
}
