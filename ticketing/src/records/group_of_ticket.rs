//! Groups of tickets: a named batch of tickets of one type for an event.

use super::{Event, Resource};
use crate::validation::{Validate, ValidationError, Validator};
use optimistic_core::{Identified, Record, RecordId};
use serde::{Deserialize, Serialize};

/// Group of tickets row, with its event joined
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOfTicket {
    /// Persisted id
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// Kind of ticket in this group (`vip`, `standard`, ...)
    #[serde(rename = "type")]
    pub ticket_type: String,
    /// Number of tickets in the group
    pub quantity: u32,
    /// Event the tickets are for
    pub event_id: RecordId,
    /// Joined event
    pub event: Option<Event>,
}

impl GroupOfTicket {
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
pub struct NewGroupOfTicketParams {
    /// Display name
    pub name: String,
    /// Kind of ticket
    #[serde(rename = "type")]
    pub ticket_type: String,
    /// Number of tickets
    pub quantity: u32,
    /// Event the tickets are for
    pub event_id: RecordId,
}

/// Update shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateGroupOfTicketParams {
    /// New display name
    pub name: Option<String>,
    /// New kind of ticket
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    /// New number of tickets
    pub quantity: Option<u32>,
    /// New event
    pub event_id: Option<RecordId>,
}

impl Validate for NewGroupOfTicketParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required("name", &self.name)
            .required("type", &self.ticket_type)
            .positive("quantity", self.quantity)
            .reference("eventId", &self.event_id)
            .finish()
    }
}

impl Validate for UpdateGroupOfTicketParams {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .required_if_present("name", self.name.as_deref())
            .required_if_present("type", self.ticket_type.as_deref())
            .positive_if_present("quantity", self.quantity)
            .reference_if_present("eventId", self.event_id.as_ref())
            .finish()
    }
}

impl Identified for GroupOfTicket {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for GroupOfTicket {
    type Draft = NewGroupOfTicketParams;
    type Patch = UpdateGroupOfTicketParams;
    type Parent = Event;

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn provisional(draft: NewGroupOfTicketParams) -> Self {
        Self {
            id: RecordId::optimistic(),
            name: draft.name,
            ticket_type: draft.ticket_type,
            quantity: draft.quantity,
            event_id: draft.event_id,
            event: None,
        }
    }

    fn merge(&mut self, patch: UpdateGroupOfTicketParams) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(ticket_type) = patch.ticket_type {
            self.ticket_type = ticket_type;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(event_id) = patch.event_id {
            self.event_id = event_id;
        }
    }

    fn parent_id(draft: &NewGroupOfTicketParams) -> Option<&RecordId> {
        Some(&draft.event_id)
    }

    fn patch_parent_id(patch: &UpdateGroupOfTicketParams) -> Option<&RecordId> {
        patch.event_id.as_ref()
    }

    fn attach_parent(&mut self, event: Event) {
        self.event = Some(event.detached());
    }
}

impl Resource for GroupOfTicket {
    const NAME: &'static str = "GroupOfTicket";
    const LISTING_PATH: &'static str = "/group-of-tickets";

    fn validate_draft(draft: &NewGroupOfTicketParams) -> Result<(), ValidationError> {
        draft.validate()
    }

    fn validate_patch(patch: &UpdateGroupOfTicketParams) -> Result<(), ValidationError> {
        patch.validate()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::records::NewEventParams;
    use chrono::NaiveDate;
    use optimistic_core::{OptimisticAction, apply};

    fn event(id: &str) -> Event {
        let mut event = Event::provisional(NewEventParams {
            event_name: format!("Event {id}"),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            location: None,
            description: "Showcase".to_string(),
            organizer_id: RecordId::new("org-1"),
        });
        event.id = RecordId::new(id);
        event
    }

    #[test]
    fn quantity_must_be_positive() {
        let error = NewGroupOfTicketParams {
            name: "Early birds".to_string(),
            ticket_type: "standard".to_string(),
            quantity: 0,
            event_id: RecordId::new("evt-1"),
        }
        .validate()
        .unwrap_err();

        assert_eq!(error.fields().len(), 1);
        assert_eq!(error.messages("quantity"), ["Must be at least 1"]);
    }

    #[test]
    fn type_field_uses_wire_name() {
        let json = serde_json::to_value(UpdateGroupOfTicketParams {
            ticket_type: Some("vip".to_string()),
            ..UpdateGroupOfTicketParams::default()
        })
        .unwrap();
        assert_eq!(json["type"], "vip");
    }

    #[test]
    fn moving_to_another_event_rejoins_it() {
        let mut group = GroupOfTicket::provisional(NewGroupOfTicketParams {
            name: "Early birds".to_string(),
            ticket_type: "standard".to_string(),
            quantity: 50,
            event_id: RecordId::new("evt-1"),
        });
        group.id = RecordId::new("grp-1");
        group.attach_parent(event("evt-1"));
        let action = OptimisticAction::Update {
            id: RecordId::new("grp-1"),
            patch: UpdateGroupOfTicketParams {
                event_id: Some(RecordId::new("evt-2")),
                ..UpdateGroupOfTicketParams::default()
            },
        };
        let next = apply(&[group], &action, &[event("evt-1"), event("evt-2")]);

        assert_eq!(next[0].event_id, RecordId::new("evt-2"));
        assert_eq!(next[0].event.as_ref().map(|e| e.id.as_str()), Some("evt-2"));
    }
}
