//! Events.

use super::{Organizer, Resource};
use crate::types::{EventStatus, UserId};
use crate::validation::{Validate, ValidationError, Validator};
use chrono::{DateTime, NaiveDate, Utc};
use optimistic_core::{Identified, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Event row, with its organizer joined
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Persisted id
    pub id: RecordId,
    /// Title
    pub event_name: String,
    /// Day the event takes place
    pub date: NaiveDate,
    /// Venue, if announced
    pub location: Option<String>,
    /// Free-form description
    pub description: String,
    /// Publication status
    pub status: EventStatus,
    /// Organizer running the event
    pub organizer_id: RecordId,
    /// Owner, unknown until persisted
    pub user_id: Option<UserId>,
    /// Set by persistence
    pub created_at: Option<DateTime<Utc>>,
    /// Set by persistence, refreshed on update
    pub updated_at: Option<DateTime<Utc>>,
    /// Joined organizer
    pub organizer: Option<Organizer>,
}

impl Event {
    /// The row without its joined organizer
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.organizer = None;
        self
    }
}

/// Insert shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventParams {
    /// Title
    pub event_name: String,
    /// Day the event takes place
    pub date: NaiveDate,
    /// Venue
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form description
    pub description: String,
    /// Organizer running the event
    pub organizer_id: RecordId,
}

/// Update shape
///
/// `status` is only ever set on its own, by the publication toggle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateEventParams {
    /// New title
    pub event_name: Option<String>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New venue
    pub location: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New organizer
    pub organizer_id: Option<RecordId>,
    /// New publication status
    pub status: Option<EventStatus>,
}

impl UpdateEventParams {
    /// Patch that only changes the publication status
    #[must_use]
    pub fn status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Validate for NewEventParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("eventName", &self.event_name)
            .required("description", &self.description)
            .required_if_present("location", self.location.as_deref())
            .reference("organizerId", &self.organizer_id)
            .finish()
    }
}

impl Validate for UpdateEventParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required_if_present("eventName", self.event_name.as_deref())
            .required_if_present("description", self.description.as_deref())
            .required_if_present("location", self.location.as_deref())
            .reference_if_present("organizerId", self.organizer_id.as_ref())
            .finish()
    }
}

impl Identified for Event {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Event {
    type Draft = NewEventParams;
    type Patch = UpdateEventParams;
    type Parent = Organizer;

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn provisional(draft: NewEventParams) -> Self {
        Self {
            id: RecordId::optimistic(),
            event_name: draft.event_name,
            date: draft.date,
            location: draft.location,
            description: draft.description,
            status: EventStatus::default(),
            organizer_id: draft.organizer_id,
            user_id: None,
            created_at: None,
            updated_at: None,
            organizer: None,
        }
    }

    fn merge(&mut self, patch: UpdateEventParams) {
        if let Some(event_name) = patch.event_name {
            self.event_name = event_name;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(organizer_id) = patch.organizer_id {
            self.organizer_id = organizer_id;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn parent_id(draft: &NewEventParams) -> Option<&RecordId> {
        Some(&draft.organizer_id)
    }

    fn patch_parent_id(patch: &UpdateEventParams) -> Option<&RecordId> {
        patch.organizer_id.as_ref()
    }

    fn attach_parent(&mut self, organizer: Organizer) {
        self.organizer = Some(organizer);
    }
}

impl Resource for Event {
    const NAME: &'static str = "Event";
    const LISTING_PATH: &'static str = "/events";

    fn validate_draft(draft: &NewEventParams) -> Result<(), ValidationError> {
        draft.validate()
    }

    fn validate_patch(patch: &UpdateEventParams) -> Result<(), ValidationError> {
        patch.validate()
    }
}
