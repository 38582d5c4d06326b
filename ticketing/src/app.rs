//! Application wiring: one store per resource, all sharing one backend.

use crate::auth::{AuthError, Authenticator, Principal, check_auth};
use crate::config::Config;
use crate::persistence::{
    EventDetail, EventQueries, NoReferences, PersistenceError, ReferenceSource, Repository,
};
use crate::records::{
    CheckInSection, Event, GroupOfTicket, Organizer, Resource, Ticket, UpdateEventParams,
};
use crate::resource::{
    ResourceAction, ResourceEnvironment, ResourceReducer, ResourceState, ResourceStore,
};
use futures::future::try_join_all;
use optimistic_core::environment::Clock;
use optimistic_core::{RecordId, Unrelated};
use optimistic_runtime::{EffectHandle, Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Application errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The session token did not resolve to a user
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A store rejected an action or its effects did not finish in time
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A direct read failed
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Storage that serves every resource plus the event queries
pub trait Backend:
    Repository<Organizer>
    + Repository<Event>
    + Repository<GroupOfTicket>
    + Repository<CheckInSection>
    + Repository<Ticket>
    + EventQueries
    + 'static
{
}

impl<T> Backend for T where
    T: Repository<Organizer>
        + Repository<Event>
        + Repository<GroupOfTicket>
        + Repository<CheckInSection>
        + Repository<Ticket>
        + EventQueries
        + 'static
{
}

/// The signed-in application
pub struct TicketingApp {
    organizers: ResourceStore<Organizer>,
    events: ResourceStore<Event>,
    group_of_tickets: ResourceStore<GroupOfTicket>,
    check_in_sections: ResourceStore<CheckInSection>,
    tickets: ResourceStore<Ticket>,
    queries: Arc<dyn EventQueries>,
    principal: Principal,
    settle_timeout: Duration,
}

fn store<R: Resource>(
    repository: Arc<dyn Repository<R>>,
    references: Arc<dyn ReferenceSource<R::Parent>>,
    principal: &Principal,
    clock: &Arc<dyn Clock>,
    config: &Config,
) -> ResourceStore<R> {
    let environment =
        ResourceEnvironment::new(repository, references, principal.clone(), Arc::clone(clock))
            .with_sequencing(config.reconcile.sequence_requests);

    Store::with_config(
        ResourceState::default(),
        ResourceReducer::new(),
        environment,
        config.store_config(),
    )
}

impl TicketingApp {
    /// Wires every store to `backend`, acting as `principal`
    #[must_use]
    pub fn new<B: Backend>(
        backend: &Arc<B>,
        principal: Principal,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let no_references: Arc<dyn ReferenceSource<Unrelated>> = Arc::new(NoReferences);

        tracing::info!(
            user_id = %principal.user_id,
            sequencing = config.reconcile.sequence_requests,
            "Ticketing app wired"
        );

        Self {
            organizers: store::<Organizer>(
                Arc::clone(backend) as Arc<dyn Repository<Organizer>>,
                no_references,
                &principal,
                &clock,
                config,
            ),
            events: store::<Event>(
                Arc::clone(backend) as Arc<dyn Repository<Event>>,
                Arc::clone(backend) as Arc<dyn ReferenceSource<Organizer>>,
                &principal,
                &clock,
                config,
            ),
            group_of_tickets: store::<GroupOfTicket>(
                Arc::clone(backend) as Arc<dyn Repository<GroupOfTicket>>,
                Arc::clone(backend) as Arc<dyn ReferenceSource<Event>>,
                &principal,
                &clock,
                config,
            ),
            check_in_sections: store::<CheckInSection>(
                Arc::clone(backend) as Arc<dyn Repository<CheckInSection>>,
                Arc::clone(backend) as Arc<dyn ReferenceSource<Event>>,
                &principal,
                &clock,
                config,
            ),
            tickets: store::<Ticket>(
                Arc::clone(backend) as Arc<dyn Repository<Ticket>>,
                Arc::clone(backend) as Arc<dyn ReferenceSource<CheckInSection>>,
                &principal,
                &clock,
                config,
            ),
            queries: Arc::clone(backend) as Arc<dyn EventQueries>,
            principal,
            settle_timeout: config.settle_timeout(),
        }
    }

    /// Resolves the session `token`, then wires the app for that user
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] when the token has no session.
    pub async fn connect<B: Backend, A: Authenticator>(
        backend: &Arc<B>,
        authenticator: &A,
        token: &str,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Result<Self, AuthError> {
        let principal = check_auth(authenticator, token).await?;
        Ok(Self::new(backend, principal, clock, config))
    }

    /// Who the app acts as
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Organizer list
    #[must_use]
    pub const fn organizers(&self) -> &ResourceStore<Organizer> {
        &self.organizers
    }

    /// Event list
    #[must_use]
    pub const fn events(&self) -> &ResourceStore<Event> {
        &self.events
    }

    /// Group of tickets list
    #[must_use]
    pub const fn group_of_tickets(&self) -> &ResourceStore<GroupOfTicket> {
        &self.group_of_tickets
    }

    /// Check-in section list
    #[must_use]
    pub const fn check_in_sections(&self) -> &ResourceStore<CheckInSection> {
        &self.check_in_sections
    }

    /// Ticket list
    #[must_use]
    pub const fn tickets(&self) -> &ResourceStore<Ticket> {
        &self.tickets
    }

    /// Loads every list and its parent list, and waits for all of them
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if a read is still running after the
    /// configured settle timeout.
    pub async fn load(&self) -> Result<(), AppError> {
        let mut handles = vec![
            self.organizers.send(ResourceAction::Load).await?,
            self.events.send(ResourceAction::Load).await?,
            self.events.send(ResourceAction::LoadReferences).await?,
            self.group_of_tickets.send(ResourceAction::Load).await?,
            self.group_of_tickets.send(ResourceAction::LoadReferences).await?,
            self.check_in_sections.send(ResourceAction::Load).await?,
            self.check_in_sections.send(ResourceAction::LoadReferences).await?,
            self.tickets.send(ResourceAction::Load).await?,
            self.tickets.send(ResourceAction::LoadReferences).await?,
        ];

        let timeout = self.settle_timeout;
        try_join_all(handles.iter_mut().map(|handle| handle.wait_with_timeout(timeout))).await?;
        tracing::debug!("All lists loaded");
        Ok(())
    }

    /// Flips an event between public and unpublic
    ///
    /// The current status is read from the derived list, so a toggle on top
    /// of an unconfirmed toggle flips the speculative value. Returns `None`
    /// when the event is not in the list.
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownInProgress`] if the app is shutting down.
    pub async fn toggle_event_status(&self, id: &RecordId) -> Result<Option<EffectHandle>, AppError> {
        let status = self
            .events
            .state(|state| state.derived().iter().find(|event| &event.id == id).map(|event| event.status))
            .await;

        let Some(status) = status else {
            tracing::debug!(event_id = %id, "Toggle ignored: event not listed");
            return Ok(None);
        };

        let handle = self
            .events
            .send(ResourceAction::Update {
                id: id.clone(),
                params: UpdateEventParams::status(status.toggled()),
            })
            .await?;
        Ok(Some(handle))
    }

    /// Every public event, whoever owns it
    ///
    /// # Errors
    ///
    /// Fails when storage cannot be read.
    pub async fn public_events(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.queries.list_public(&self.principal).await?)
    }

    /// An event with its groups of tickets and check-in sections
    ///
    /// # Errors
    ///
    /// Fails when storage cannot be read.
    pub async fn event_detail(&self, id: &RecordId) -> Result<Option<EventDetail>, AppError> {
        Ok(self.queries.event_with_children(&self.principal, id).await?)
    }

    /// Waits for `handle`'s effects using the configured settle timeout
    ///
    /// # Errors
    ///
    /// [`StoreError::Timeout`] if they are still running.
    pub async fn settle(&self, handle: &mut EffectHandle) -> Result<(), AppError> {
        handle.wait_with_timeout(self.settle_timeout).await?;
        Ok(())
    }

    /// Stops every store, waiting for in-flight requests
    ///
    /// # Errors
    ///
    /// [`StoreError::ShutdownTimeout`] if a store still has running effects.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.organizers.shutdown_default().await?;
        self.events.shutdown_default().await?;
        self.group_of_tickets.shutdown_default().await?;
        self.check_in_sections.shutdown_default().await?;
        self.tickets.shutdown_default().await?;
        Ok(())
    }
}
