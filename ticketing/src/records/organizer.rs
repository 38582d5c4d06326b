//! Organizers: the people or companies events are run by.

use super::Resource;
use crate::types::UserId;
use crate::validation::{Validate, ValidationError, Validator};
use optimistic_core::{Identified, Record, RecordId, Unrelated};
use serde::{Deserialize, Serialize};

/// Organizer row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizer {
    /// Persisted id
    pub id: RecordId,
    /// Display name
    pub organizer_name: String,
    /// Contact attendees can trust (email, phone, ...)
    pub trusted_contact: String,
    /// Owner, unknown until persisted
    pub user_id: Option<UserId>,
}

/// Insert shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganizerParams {
    /// Display name
    pub organizer_name: String,
    /// Contact attendees can trust
    pub trusted_contact: String,
}

/// Update shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrganizerParams {
    /// New display name
    pub organizer_name: Option<String>,
    /// New contact
    pub trusted_contact: Option<String>,
}

impl Validate for NewOrganizerParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("organizerName", &self.organizer_name)
            .required("trustedContact", &self.trusted_contact)
            .finish()
    }
}

impl Validate for UpdateOrganizerParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required_if_present("organizerName", self.organizer_name.as_deref())
            .required_if_present("trustedContact", self.trusted_contact.as_deref())
            .finish()
    }
}

impl Identified for Organizer {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Organizer {
    type Draft = NewOrganizerParams;
    type Patch = UpdateOrganizerParams;
    type Parent = Unrelated;

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn provisional(draft: NewOrganizerParams) -> Self {
        Self {
            id: RecordId::optimistic(),
            organizer_name: draft.organizer_name,
            trusted_contact: draft.trusted_contact,
            user_id: None,
        }
    }

    fn merge(&mut self, patch: UpdateOrganizerParams) {
        if let Some(organizer_name) = patch.organizer_name {
            self.organizer_name = organizer_name;
        }
        if let Some(trusted_contact) = patch.trusted_contact {
            self.trusted_contact = trusted_contact;
        }
    }
}

impl Resource for Organizer {
    const NAME: &'static str = "Organizer";
    const LISTING_PATH: &'static str = "/organizers";

    fn validate_draft(draft: &NewOrganizerParams) -> Result<(), ValidationError> {
        draft.validate()
    }

    fn validate_patch(patch: &UpdateOrganizerParams) -> Result<(), ValidationError> {
        patch.validate()
    }
}
