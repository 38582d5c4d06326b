//! Check-in sections: the doors and desks tickets are scanned at.

use super::{Event, Resource};
use crate::validation::{Validate, ValidationError, Validator};
use chrono::NaiveDateTime;
use optimistic_core::{Identified, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Check-in section row, with its event joined
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInSection {
    /// Persisted id
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Directions for attendees
    pub description: String,
    /// When the section opens
    pub check_in_at: NaiveDateTime,
    /// Event the section belongs to
    pub event_id: RecordId,
    /// Joined event
    pub event: Option<Event>,
}

impl CheckInSection {
    /// The row without its joined event
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.event = None;
        self
    }
}

/// Insert shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCheckInSectionParams {
    /// Display name
    pub name: String,
    /// Directions for attendees
    pub description: String,
    /// When the section opens
    pub check_in_at: NaiveDateTime,
    /// Event the section belongs to
    pub event_id: RecordId,
}

/// Update shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCheckInSectionParams {
    /// New display name
    pub name: Option<String>,
    /// New directions
    pub description: Option<String>,
    /// New opening time
    pub check_in_at: Option<NaiveDateTime>,
    /// New event
    pub event_id: Option<RecordId>,
}

impl Validate for NewCheckInSectionParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .required("description", &self.description)
            .reference("eventId", &self.event_id)
            .finish()
    }
}

impl Validate for UpdateCheckInSectionParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required_if_present("name", self.name.as_deref())
            .required_if_present("description", self.description.as_deref())
            .reference_if_present("eventId", self.event_id.as_ref())
            .finish()
    }
}

impl Identified for CheckInSection {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for CheckInSection {
    type Draft = NewCheckInSectionParams;
    type Patch = UpdateCheckInSectionParams;
    type Parent = Event;

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn provisional(draft: NewCheckInSectionParams) -> Self {
        Self {
            id: RecordId::optimistic(),
            name: draft.name,
            description: draft.description,
            check_in_at: draft.check_in_at,
            event_id: draft.event_id,
            event: None,
        }
    }

    fn merge(&mut self, patch: UpdateCheckInSectionParams) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(check_in_at) = patch.check_in_at {
            self.check_in_at = check_in_at;
        }
        if let Some(event_id) = patch.event_id {
            self.event_id = event_id;
        }
    }

    fn parent_id(draft: &NewCheckInSectionParams) -> Option<&RecordId> {
        Some(&draft.event_id)
    }

    fn patch_parent_id(patch: &UpdateCheckInSectionParams) -> Option<&RecordId> {
        patch.event_id.as_ref()
    }

    fn attach_parent(&mut self, event: Event) {
        self.event = Some(event.detached());
    }
}

impl Resource for CheckInSection {
    const NAME: &'static str = "CheckInSection";
    const LISTING_PATH: &'static str = "/check-in-sections";

    fn validate_draft(draft: &NewCheckInSectionParams) -> Result<(), ValidationError> {
        draft.validate()
    }

    fn validate_patch(patch: &UpdateCheckInSectionParams) -> Result<(), ValidationError> {
        patch.validate()
    }
}
