//! Ticketing records.
//!
//! Each resource has a select shape (the record itself, including its one
//! joined parent), an insert shape (`New…Params`) and an update shape
//! (`Update…Params`, every field optional). The reconciler only ever sees
//! these three types through [`optimistic_core::Record`].
//!
//! | resource           | parent resolved on create |
//! |--------------------|---------------------------|
//! | [`Organizer`]      | none                      |
//! | [`Event`]          | [`Organizer`]             |
//! | [`GroupOfTicket`]  | [`Event`]                 |
//! | [`CheckInSection`] | [`Event`]                 |
//! | [`Ticket`]         | [`CheckInSection`]        |

pub mod check_in_section;
pub mod event;
pub mod group_of_ticket;
pub mod organizer;
pub mod ticket;

pub use check_in_section::{CheckInSection, NewCheckInSectionParams, UpdateCheckInSectionParams};
pub use event::{Event, NewEventParams, UpdateEventParams};
pub use group_of_ticket::{GroupOfTicket, NewGroupOfTicketParams, UpdateGroupOfTicketParams};
pub use organizer::{NewOrganizerParams, Organizer, UpdateOrganizerParams};
pub use ticket::{NewTicketParams, Ticket, UpdateTicketParams};

use crate::validation::ValidationError;
use optimistic_core::Record;

/// A record kept in an optimistic list by the resource reducer
pub trait Resource: Record {
    /// Singular display name used in notifications (`"Event created!"`)
    const NAME: &'static str;

    /// Listing a successful delete navigates back to
    const LISTING_PATH: &'static str;

    /// Checks an insert payload
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    fn validate_draft(draft: &Self::Draft) -> Result<(), ValidationError>;

    /// Checks an update payload
    ///
    /// # Errors
    ///
    /// Returns the failing fields.
    fn validate_patch(patch: &Self::Patch) -> Result<(), ValidationError>;
}
