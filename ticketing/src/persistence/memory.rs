//! In-memory database.
//!
//! Tables are plain vectors in insertion order behind a `tokio` lock. Rows
//! are stored without joins; joins are resolved one level deep when rows
//! are read. Deletes cascade the way the foreign keys of the relational
//! schema do.

use super::{EventDetail, EventQueries, PersistenceError, Repository};
use crate::auth::Principal;
use crate::records::{
    CheckInSection, Event, GroupOfTicket, NewCheckInSectionParams, NewEventParams,
    NewGroupOfTicketParams, NewOrganizerParams, NewTicketParams, Organizer, Resource, Ticket,
    UpdateCheckInSectionParams, UpdateEventParams, UpdateGroupOfTicketParams,
    UpdateOrganizerParams, UpdateTicketParams,
};
use crate::types::{TICKET_STATUS_CREATED, UserId};
use async_trait::async_trait;
use optimistic_core::environment::Clock;
use optimistic_core::{Identified, Record, RecordId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    organizers: Vec<Organizer>,
    events: Vec<Event>,
    group_of_tickets: Vec<GroupOfTicket>,
    check_in_sections: Vec<CheckInSection>,
    tickets: Vec<Ticket>,
}

/// In-memory implementation of every repository
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
    offline: AtomicBool,
}

impl MemoryDatabase {
    /// Creates an empty database stamping rows with `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
            offline: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with [`PersistenceError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        tracing::info!(offline, "Memory database availability changed");
    }

    fn ensure_online(&self) -> Result<(), PersistenceError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PersistenceError::Unavailable("Database is unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for MemoryDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDatabase")
            .field("offline", &self.offline.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn new_id() -> RecordId {
    RecordId::new(Uuid::new_v4().to_string())
}

/// Rows that belong to a user
trait Owned {
    fn owner(&self) -> Option<UserId>;
}

impl Owned for Organizer {
    fn owner(&self) -> Option<UserId> {
        self.user_id
    }
}

impl Owned for Event {
    fn owner(&self) -> Option<UserId> {
        self.user_id
    }
}

impl Owned for Ticket {
    fn owner(&self) -> Option<UserId> {
        self.user_id
    }
}

fn is_owned_by<R: Owned>(row: &R, principal: &Principal) -> bool {
    row.owner() == Some(principal.user_id)
}

/// Index of the row with `id`
fn locate<R: Resource>(rows: &[R], id: &RecordId) -> Result<usize, PersistenceError> {
    rows.iter()
        .position(|row| row.id() == id)
        .ok_or_else(|| PersistenceError::not_found::<R>(id))
}

/// Index of the row with `id`, which must belong to `principal`
fn locate_owned<R: Resource + Owned>(
    rows: &[R],
    id: &RecordId,
    principal: &Principal,
) -> Result<usize, PersistenceError> {
    let index = locate(rows, id)?;
    if is_owned_by(&rows[index], principal) {
        Ok(index)
    } else {
        Err(PersistenceError::forbidden::<R>(id))
    }
}

fn require<R: Resource>(rows: &[R], id: &RecordId) -> Result<(), PersistenceError> {
    if rows.iter().any(|row| row.id() == id) {
        Ok(())
    } else {
        Err(PersistenceError::Constraint(format!("{} {id} does not exist", R::NAME)))
    }
}

impl Tables {
    fn join_event(&self, event: &Event) -> Event {
        let mut event = event.clone();
        event.organizer = self
            .organizers
            .iter()
            .find(|o| o.id == event.organizer_id)
            .cloned();
        event
    }

    fn stored_event(&self, id: &RecordId) -> Option<Event> {
        self.events.iter().find(|e| &e.id == id).cloned()
    }

    fn join_group(&self, group: &GroupOfTicket) -> GroupOfTicket {
        let mut group = group.clone();
        group.event = self.stored_event(&group.event_id);
        group
    }

    fn join_section(&self, section: &CheckInSection) -> CheckInSection {
        let mut section = section.clone();
        section.event = self.stored_event(&section.event_id);
        section
    }

    fn join_ticket(&self, ticket: &Ticket) -> Ticket {
        let mut ticket = ticket.clone();
        ticket.check_in_section = self
            .check_in_sections
            .iter()
            .find(|s| s.id == ticket.check_in_section_id)
            .cloned();
        ticket.group_of_ticket = self
            .group_of_tickets
            .iter()
            .find(|g| g.id == ticket.group_of_ticket_id)
            .cloned();
        ticket
    }

    fn remove_tickets_where(&mut self, predicate: impl Fn(&Ticket) -> bool) -> usize {
        let before = self.tickets.len();
        self.tickets.retain(|ticket| !predicate(ticket));
        before - self.tickets.len()
    }

    fn cascade_group(&mut self, id: &RecordId) {
        let removed = self.remove_tickets_where(|t| &t.group_of_ticket_id == id);
        tracing::debug!(group_of_ticket = %id, tickets = removed, "Cascaded group delete");
    }

    fn cascade_section(&mut self, id: &RecordId) {
        let removed = self.remove_tickets_where(|t| &t.check_in_section_id == id);
        tracing::debug!(check_in_section = %id, tickets = removed, "Cascaded section delete");
    }

    fn cascade_event(&mut self, id: &RecordId) {
        let groups: Vec<RecordId> = self
            .group_of_tickets
            .iter()
            .filter(|g| &g.event_id == id)
            .map(|g| g.id.clone())
            .collect();
        let sections: Vec<RecordId> = self
            .check_in_sections
            .iter()
            .filter(|s| &s.event_id == id)
            .map(|s| s.id.clone())
            .collect();

        self.group_of_tickets.retain(|g| &g.event_id != id);
        self.check_in_sections.retain(|s| &s.event_id != id);
        for group in &groups {
            self.cascade_group(group);
        }
        for section in &sections {
            self.cascade_section(section);
        }
    }

    fn cascade_organizer(&mut self, id: &RecordId) {
        let events: Vec<RecordId> = self
            .events
            .iter()
            .filter(|e| &e.organizer_id == id)
            .map(|e| e.id.clone())
            .collect();

        self.events.retain(|e| &e.organizer_id != id);
        for event in &events {
            self.cascade_event(event);
        }
    }
}

#[async_trait]
impl Repository<Organizer> for MemoryDatabase {
    async fn create(
        &self,
        principal: &Principal,
        params: NewOrganizerParams,
    ) -> Result<Organizer, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let mut organizer = Organizer::provisional(params);
        organizer.id = new_id();
        organizer.user_id = Some(principal.user_id);
        tables.organizers.push(organizer.clone());

        tracing::debug!(id = %organizer.id, "Organizer created");
        Ok(organizer)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &RecordId,
        params: UpdateOrganizerParams,
    ) -> Result<Organizer, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.organizers, id, principal)?;
        let organizer = &mut tables.organizers[index];
        organizer.merge(params);
        Ok(organizer.clone())
    }

    async fn delete(&self, principal: &Principal, id: &RecordId) -> Result<Organizer, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.organizers, id, principal)?;
        let organizer = tables.organizers.remove(index);
        tables.cascade_organizer(id);
        Ok(organizer)
    }

    async fn list(&self, principal: &Principal) -> Result<Vec<Organizer>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .organizers
            .iter()
            .filter(|o| is_owned_by(*o, principal))
            .cloned()
            .collect())
    }

    async fn get(&self, principal: &Principal, id: &RecordId) -> Result<Option<Organizer>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .organizers
            .iter()
            .find(|o| &o.id == id && is_owned_by(*o, principal))
            .cloned())
    }
}

#[async_trait]
impl Repository<Event> for MemoryDatabase {
    async fn create(
        &self,
        principal: &Principal,
        params: NewEventParams,
    ) -> Result<Event, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        require(&tables.organizers, &params.organizer_id)?;

        let now = self.clock.now();
        let mut event = Event::provisional(params);
        event.id = new_id();
        event.user_id = Some(principal.user_id);
        event.created_at = Some(now);
        event.updated_at = Some(now);
        tables.events.push(event.clone());

        tracing::debug!(id = %event.id, "Event created");
        Ok(tables.join_event(&event))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &RecordId,
        params: UpdateEventParams,
    ) -> Result<Event, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.events, id, principal)?;
        if let Some(organizer_id) = &params.organizer_id {
            require(&tables.organizers, organizer_id)?;
        }

        let now = self.clock.now();
        let event = &mut tables.events[index];
        event.merge(params);
        event.updated_at = Some(now);
        let stored = event.clone();
        Ok(tables.join_event(&stored))
    }

    async fn delete(&self, principal: &Principal, id: &RecordId) -> Result<Event, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.events, id, principal)?;
        let event = tables.events.remove(index);
        tables.cascade_event(id);
        Ok(event)
    }

    async fn list(&self, principal: &Principal) -> Result<Vec<Event>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .events
            .iter()
            .filter(|e| is_owned_by(*e, principal))
            .map(|e| tables.join_event(e))
            .collect())
    }

    async fn get(&self, principal: &Principal, id: &RecordId) -> Result<Option<Event>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .events
            .iter()
            .find(|e| &e.id == id && is_owned_by(*e, principal))
            .map(|e| tables.join_event(e)))
    }
}

#[async_trait]
impl Repository<GroupOfTicket> for MemoryDatabase {
    async fn create(
        &self,
        _principal: &Principal,
        params: NewGroupOfTicketParams,
    ) -> Result<GroupOfTicket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        require(&tables.events, &params.event_id)?;

        let mut group = GroupOfTicket::provisional(params);
        group.id = new_id();
        tables.group_of_tickets.push(group.clone());

        tracing::debug!(id = %group.id, "Group of tickets created");
        Ok(tables.join_group(&group))
    }

    async fn update(
        &self,
        _principal: &Principal,
        id: &RecordId,
        params: UpdateGroupOfTicketParams,
    ) -> Result<GroupOfTicket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate(&tables.group_of_tickets, id)?;
        if let Some(event_id) = &params.event_id {
            require(&tables.events, event_id)?;
        }

        let group = &mut tables.group_of_tickets[index];
        group.merge(params);
        let stored = group.clone();
        Ok(tables.join_group(&stored))
    }

    async fn delete(&self, _principal: &Principal, id: &RecordId) -> Result<GroupOfTicket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate(&tables.group_of_tickets, id)?;
        let group = tables.group_of_tickets.remove(index);
        tables.cascade_group(id);
        Ok(group)
    }

    async fn list(&self, _principal: &Principal) -> Result<Vec<GroupOfTicket>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables.group_of_tickets.iter().map(|g| tables.join_group(g)).collect())
    }

    async fn get(&self, _principal: &Principal, id: &RecordId) -> Result<Option<GroupOfTicket>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .group_of_tickets
            .iter()
            .find(|g| &g.id == id)
            .map(|g| tables.join_group(g)))
    }
}

#[async_trait]
impl Repository<CheckInSection> for MemoryDatabase {
    async fn create(
        &self,
        _principal: &Principal,
        params: NewCheckInSectionParams,
    ) -> Result<CheckInSection, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        require(&tables.events, &params.event_id)?;

        let mut section = CheckInSection::provisional(params);
        section.id = new_id();
        tables.check_in_sections.push(section.clone());

        tracing::debug!(id = %section.id, "Check-in section created");
        Ok(tables.join_section(&section))
    }

    async fn update(
        &self,
        _principal: &Principal,
        id: &RecordId,
        params: UpdateCheckInSectionParams,
    ) -> Result<CheckInSection, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate(&tables.check_in_sections, id)?;
        if let Some(event_id) = &params.event_id {
            require(&tables.events, event_id)?;
        }

        let section = &mut tables.check_in_sections[index];
        section.merge(params);
        let stored = section.clone();
        Ok(tables.join_section(&stored))
    }

    async fn delete(&self, _principal: &Principal, id: &RecordId) -> Result<CheckInSection, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate(&tables.check_in_sections, id)?;
        let section = tables.check_in_sections.remove(index);
        tables.cascade_section(id);
        Ok(section)
    }

    async fn list(&self, _principal: &Principal) -> Result<Vec<CheckInSection>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables.check_in_sections.iter().map(|s| tables.join_section(s)).collect())
    }

    async fn get(&self, _principal: &Principal, id: &RecordId) -> Result<Option<CheckInSection>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .check_in_sections
            .iter()
            .find(|s| &s.id == id)
            .map(|s| tables.join_section(s)))
    }
}

#[async_trait]
impl Repository<Ticket> for MemoryDatabase {
    async fn create(
        &self,
        principal: &Principal,
        params: NewTicketParams,
    ) -> Result<Ticket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        require(&tables.check_in_sections, &params.check_in_section_id)?;
        require(&tables.group_of_tickets, &params.group_of_ticket_id)?;

        let now = self.clock.now();
        let mut ticket = Ticket::provisional(params);
        ticket.id = new_id();
        ticket.status = TICKET_STATUS_CREATED.to_string();
        ticket.user_id = Some(principal.user_id);
        ticket.created_at = Some(now);
        ticket.updated_at = Some(now);
        tables.tickets.push(ticket.clone());

        tracing::debug!(id = %ticket.id, "Ticket created");
        Ok(tables.join_ticket(&ticket))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &RecordId,
        params: UpdateTicketParams,
    ) -> Result<Ticket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.tickets, id, principal)?;
        if let Some(section_id) = &params.check_in_section_id {
            require(&tables.check_in_sections, section_id)?;
        }
        if let Some(group_id) = &params.group_of_ticket_id {
            require(&tables.group_of_tickets, group_id)?;
        }

        let now = self.clock.now();
        let ticket = &mut tables.tickets[index];
        ticket.merge(params);
        ticket.updated_at = Some(now);
        let stored = ticket.clone();
        Ok(tables.join_ticket(&stored))
    }

    async fn delete(&self, principal: &Principal, id: &RecordId) -> Result<Ticket, PersistenceError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let index = locate_owned(&tables.tickets, id, principal)?;
        Ok(tables.tickets.remove(index))
    }

    async fn list(&self, principal: &Principal) -> Result<Vec<Ticket>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .tickets
            .iter()
            .filter(|t| is_owned_by(*t, principal))
            .map(|t| tables.join_ticket(t))
            .collect())
    }

    async fn get(&self, principal: &Principal, id: &RecordId) -> Result<Option<Ticket>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .tickets
            .iter()
            .find(|t| &t.id == id && is_owned_by(*t, principal))
            .map(|t| tables.join_ticket(t)))
    }
}

#[async_trait]
impl EventQueries for MemoryDatabase {
    async fn list_public(&self, _principal: &Principal) -> Result<Vec<Event>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        Ok(tables
            .events
            .iter()
            .filter(|e| e.status.is_public())
            .map(|e| tables.join_event(e))
            .collect())
    }

    async fn event_with_children(
        &self,
        _principal: &Principal,
        id: &RecordId,
    ) -> Result<Option<EventDetail>, PersistenceError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;

        let Some(event) = tables.events.iter().find(|e| &e.id == id) else {
            return Ok(None);
        };

        Ok(Some(EventDetail {
            event: tables.join_event(event),
            group_of_tickets: tables
                .group_of_tickets
                .iter()
                .filter(|g| &g.event_id == id)
                .cloned()
                .collect(),
            check_in_sections: tables
                .check_in_sections
                .iter()
                .filter(|s| &s.event_id == id)
                .cloned()
                .collect(),
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::EventStatus;
    use chrono::{Duration, NaiveDate};
    use optimistic_testing::{SteppingClock, test_clock};

    fn principal() -> Principal {
        Principal::new(UserId::new(), "owner@example.com")
    }

    fn database() -> MemoryDatabase {
        MemoryDatabase::new(Arc::new(SteppingClock::new(test_clock().now(), Duration::seconds(1))))
    }

    async fn seed_organizer(db: &MemoryDatabase, owner: &Principal) -> Organizer {
        Repository::<Organizer>::create(
            db,
            owner,
            NewOrganizerParams {
                organizer_name: "Night Owls".to_string(),
                trusted_contact: "owls@example.com".to_string(),
            },
        )
        .await
        .unwrap()
    }

    async fn seed_event(db: &MemoryDatabase, owner: &Principal, organizer: &Organizer) -> Event {
        Repository::<Event>::create(
            db,
            owner,
            NewEventParams {
                event_name: "Launch".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                location: None,
                description: "Release party".to_string(),
                organizer_id: organizer.id.clone(),
            },
        )
        .await
        .unwrap()
    }

    async fn seed_children(db: &MemoryDatabase, owner: &Principal, event: &Event) -> Ticket {
        let group = Repository::<GroupOfTicket>::create(
            db,
            owner,
            NewGroupOfTicketParams {
                name: "Early birds".to_string(),
                ticket_type: "standard".to_string(),
                quantity: 50,
                event_id: event.id.clone(),
            },
        )
        .await
        .unwrap();
        let section = Repository::<CheckInSection>::create(
            db,
            owner,
            NewCheckInSectionParams {
                name: "North gate".to_string(),
                description: "Left of the fountain".to_string(),
                check_in_at: NaiveDate::from_ymd_opt(2025, 6, 1)
                    .unwrap()
                    .and_hms_opt(18, 0, 0)
                    .unwrap(),
                event_id: event.id.clone(),
            },
        )
        .await
        .unwrap();
        Repository::<Ticket>::create(
            db,
            owner,
            NewTicketParams {
                name: "Ada".to_string(),
                user_mail: "ada@example.com".to_string(),
                check_in_section_id: section.id.clone(),
                group_of_ticket_id: group.id.clone(),
                note: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_owner_timestamps_and_join() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;

        assert!(!event.id.is_sentinel());
        assert_eq!(event.user_id, Some(owner.user_id));
        assert_eq!(event.status, EventStatus::Unpublic);
        assert_eq!(event.created_at, Some(test_clock().now()));
        assert_eq!(event.organizer, Some(organizer));
    }

    #[tokio::test]
    async fn ticket_reads_join_section_and_group() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;
        let ticket = seed_children(&db, &owner, &event).await;

        let listed = Repository::<Ticket>::list(&db, &owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        let group = listed[0].group_of_ticket.as_ref().unwrap();
        assert_eq!(group.id, ticket.group_of_ticket_id);
        assert_eq!(group.name, "Early birds");
        assert_eq!(
            listed[0].check_in_section.as_ref().map(|s| &s.id),
            Some(&ticket.check_in_section_id)
        );

        let fetched = Repository::<Ticket>::get(&db, &owner, &ticket.id).await.unwrap().unwrap();
        assert_eq!(fetched.group_of_ticket.map(|g| g.id), Some(ticket.group_of_ticket_id));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;

        let updated = Repository::<Event>::update(
            &db,
            &owner,
            &event.id,
            UpdateEventParams::status(EventStatus::Public),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, EventStatus::Public);
        assert_eq!(updated.created_at, event.created_at);
        assert!(updated.updated_at > event.updated_at);
    }

    #[tokio::test]
    async fn lists_are_scoped_to_the_owner() {
        let db = database();
        let owner = principal();
        let stranger = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;

        assert_eq!(Repository::<Event>::list(&db, &owner).await.unwrap().len(), 1);
        assert!(Repository::<Event>::list(&db, &stranger).await.unwrap().is_empty());
        assert_eq!(Repository::<Event>::get(&db, &stranger, &event.id).await.unwrap(), None);

        let result = Repository::<Event>::delete(&db, &stranger, &event.id).await;
        assert!(matches!(result, Err(PersistenceError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn missing_rows_and_parents_are_errors() {
        let db = database();
        let owner = principal();

        let result = Repository::<Event>::update(
            &db,
            &owner,
            &RecordId::new("nope"),
            UpdateEventParams::default(),
        )
        .await;
        assert!(matches!(result, Err(PersistenceError::NotFound { .. })));

        let result = Repository::<Event>::create(
            &db,
            &owner,
            NewEventParams {
                event_name: "Orphan".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                location: None,
                description: "No organizer".to_string(),
                organizer_id: RecordId::new("missing"),
            },
        )
        .await;
        assert_eq!(
            result.unwrap_err(),
            PersistenceError::Constraint("Organizer missing does not exist".to_string())
        );
    }

    #[tokio::test]
    async fn deleting_an_organizer_cascades_to_tickets() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;
        seed_children(&db, &owner, &event).await;

        Repository::<Organizer>::delete(&db, &owner, &organizer.id).await.unwrap();

        assert!(Repository::<Event>::list(&db, &owner).await.unwrap().is_empty());
        assert!(Repository::<GroupOfTicket>::list(&db, &owner).await.unwrap().is_empty());
        assert!(Repository::<CheckInSection>::list(&db, &owner).await.unwrap().is_empty());
        assert!(Repository::<Ticket>::list(&db, &owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_section_removes_only_its_tickets() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;
        let ticket = seed_children(&db, &owner, &event).await;

        Repository::<CheckInSection>::delete(&db, &owner, &ticket.check_in_section_id)
            .await
            .unwrap();

        assert!(Repository::<Ticket>::list(&db, &owner).await.unwrap().is_empty());
        assert_eq!(Repository::<GroupOfTicket>::list(&db, &owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn public_listing_ignores_owner() {
        let db = database();
        let owner = principal();
        let visitor = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let public = seed_event(&db, &owner, &organizer).await;
        seed_event(&db, &owner, &organizer).await;

        Repository::<Event>::update(&db, &owner, &public.id, UpdateEventParams::status(EventStatus::Public))
            .await
            .unwrap();

        let listed = db.list_public(&visitor).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, public.id);
        assert!(listed[0].organizer.is_some());
    }

    #[tokio::test]
    async fn event_detail_collects_children() {
        let db = database();
        let owner = principal();
        let organizer = seed_organizer(&db, &owner).await;
        let event = seed_event(&db, &owner, &organizer).await;
        seed_children(&db, &owner, &event).await;

        let detail = db.event_with_children(&owner, &event.id).await.unwrap().unwrap();
        assert_eq!(detail.event.id, event.id);
        assert_eq!(detail.group_of_tickets.len(), 1);
        assert_eq!(detail.check_in_sections.len(), 1);

        assert_eq!(db.event_with_children(&owner, &RecordId::new("nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn offline_database_is_unavailable() {
        let db = database();
        db.set_offline(true);
        let result = Repository::<Organizer>::list(&db, &principal()).await;
        assert!(matches!(result, Err(PersistenceError::Unavailable(_))));
    }
}
