//! Tickets handed out to attendees.

use super::{CheckInSection, GroupOfTicket, Resource};
use crate::types::{TICKET_STATUS_CREATED, UserId};
use crate::validation::{Validate, ValidationError, Validator};
use chrono::{DateTime, Utc};
use optimistic_core::{Identified, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Ticket row, with its check-in section and group joined
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Persisted id
    pub id: RecordId,
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub user_mail: String,
    /// Lifecycle status, `created` on insert
    pub status: String,
    /// Where the ticket is scanned
    pub check_in_section_id: RecordId,
    /// Batch the ticket was issued from
    pub group_of_ticket_id: RecordId,
    /// Free-form note
    pub note: Option<String>,
    /// Owner, unknown until persisted
    pub user_id: Option<UserId>,
    /// Set by persistence
    pub created_at: Option<DateTime<Utc>>,
    /// Set by persistence, refreshed on update
    pub updated_at: Option<DateTime<Utc>>,
    /// Joined check-in section
    pub check_in_section: Option<CheckInSection>,
    /// Joined group of tickets, filled by list reads
    pub group_of_ticket: Option<GroupOfTicket>,
}

/// Insert shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicketParams {
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub user_mail: String,
    /// Where the ticket is scanned
    pub check_in_section_id: RecordId,
    /// Batch the ticket is issued from
    pub group_of_ticket_id: RecordId,
    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,
}

/// Update shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTicketParams {
    /// New attendee name
    pub name: Option<String>,
    /// New attendee email
    pub user_mail: Option<String>,
    /// New check-in section
    pub check_in_section_id: Option<RecordId>,
    /// New batch
    pub group_of_ticket_id: Option<RecordId>,
    /// New note
    pub note: Option<String>,
}

impl Validate for NewTicketParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .email("userMail", &self.user_mail)
            .reference("checkInSectionId", &self.check_in_section_id)
            .reference("groupOfTicketId", &self.group_of_ticket_id)
            .finish()
    }
}

impl Validate for UpdateTicketParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required_if_present("name", self.name.as_deref())
            .email_if_present("userMail", self.user_mail.as_deref())
            .reference_if_present("checkInSectionId", self.check_in_section_id.as_ref())
            .reference_if_present("groupOfTicketId", self.group_of_ticket_id.as_ref())
            .finish()
    }
}

impl Identified for Ticket {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for Ticket {
    type Draft = NewTicketParams;
    type Patch = UpdateTicketParams;
    type Parent = CheckInSection;

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn provisional(draft: NewTicketParams) -> Self {
        Self {
            id: RecordId::optimistic(),
            name: draft.name,
            user_mail: draft.user_mail,
            status: TICKET_STATUS_CREATED.to_string(),
            check_in_section_id: draft.check_in_section_id,
            group_of_ticket_id: draft.group_of_ticket_id,
            note: draft.note,
            user_id: None,
            created_at: None,
            updated_at: None,
            check_in_section: None,
            group_of_ticket: None,
        }
    }

    fn merge(&mut self, patch: UpdateTicketParams) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(user_mail) = patch.user_mail {
            self.user_mail = user_mail;
        }
        if let Some(check_in_section_id) = patch.check_in_section_id {
            self.check_in_section_id = check_in_section_id;
        }
        if let Some(group_of_ticket_id) = patch.group_of_ticket_id {
            self.group_of_ticket_id = group_of_ticket_id;
        }
        if let Some(note) = patch.note {
            self.note = Some(note);
        }
    }

    fn parent_id(draft: &NewTicketParams) -> Option<&RecordId> {
        Some(&draft.check_in_section_id)
    }

    fn patch_parent_id(patch: &UpdateTicketParams) -> Option<&RecordId> {
        patch.check_in_section_id.as_ref()
    }

    fn attach_parent(&mut self, section: CheckInSection) {
        self.check_in_section = Some(section.detached());
    }
}

impl Resource for Ticket {
    const NAME: &'static str = "Ticket";
    const LISTING_PATH: &'static str = "/tickets";

    fn validate_draft(draft: &NewTicketParams) -> Result<(), ValidationError> {
        draft.validate()
    }

    fn validate_patch(patch: &UpdateTicketParams) -> Result<(), ValidationError> {
        patch.validate()
    }
}
