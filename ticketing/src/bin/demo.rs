//! Ticketing demo
//!
//! Scripted session against the in-memory backend showing:
//! - optimistic rows before persistence confirms them
//! - validation stopping a bad submit before anything is applied
//! - the event publication toggle and the public listing
//! - cascade delete and navigation back to the listing
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=ticketing=debug cargo run --bin demo
//! ```

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use optimistic_core::environment::{Clock, SystemClock};
use optimistic_core::RecordId;
use std::sync::Arc;
use ticketing::auth::{Principal, StaticAuthenticator};
use ticketing::persistence::MemoryDatabase;
use ticketing::records::{
    NewCheckInSectionParams, NewEventParams, NewGroupOfTicketParams, NewOrganizerParams, NewTicketParams,
    Resource,
};
use ticketing::{Config, ResourceAction, ResourceStore, TicketingApp, UserId};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION: &str = "demo-session";

async fn print_rows<R: Resource>(store: &ResourceStore<R>, label: impl Fn(&R) -> String) {
    let rows = store
        .state(|state| {
            state
                .rows()
                .map(|(row, status)| format!("   [{status:?}] {} {}", row.id(), label(row)))
                .collect::<Vec<_>>()
        })
        .await;
    println!("   {} rows: {}", R::NAME, rows.len());
    for row in rows {
        println!("{row}");
    }
}

async fn first_id<R: Resource>(store: &ResourceStore<R>) -> anyhow::Result<RecordId> {
    store
        .state(|state| state.derived().first().map(|row| row.id().clone()))
        .await
        .with_context(|| format!("no {} listed", R::NAME))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🎫 Ticketing demo\n");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = Arc::new(MemoryDatabase::new(Arc::clone(&clock)));
    let authenticator = StaticAuthenticator::new();
    authenticator.sign_in(SESSION, Principal::new(UserId::new(), "organizer@example.com"));

    let app = TicketingApp::connect(&backend, &authenticator, SESSION, clock, &config).await?;
    app.load().await?;
    println!("✓ Signed in as {}", app.principal().email);

    // Organizer
    let mut handle = app
        .organizers()
        .send(ResourceAction::Create {
            params: NewOrganizerParams {
                organizer_name: "Harbour Nights".to_string(),
                trusted_contact: "contact@harbour.example".to_string(),
            },
        })
        .await?;
    println!("\n1. Organizer submitted, before persistence:");
    print_rows(app.organizers(), |o| o.organizer_name.clone()).await;
    app.settle(&mut handle).await?;
    println!("   after re-seed:");
    print_rows(app.organizers(), |o| o.organizer_name.clone()).await;
    let organizer_id = first_id(app.organizers()).await?;

    // Event
    let mut handle = app.events().send(ResourceAction::LoadReferences).await?;
    app.settle(&mut handle).await?;
    let mut handle = app
        .events()
        .send(ResourceAction::Create {
            params: NewEventParams {
                event_name: "Summer Concert".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 7, 14).context("invalid date")?,
                location: Some("Pier 4".to_string()),
                description: "Open air, all ages".to_string(),
                organizer_id: organizer_id.clone(),
            },
        })
        .await?;
    println!("\n2. Event submitted, organizer resolved from the side-loaded list:");
    print_rows(app.events(), |e| {
        let organizer = e.organizer.as_ref().map_or("?", |o| o.organizer_name.as_str());
        format!("{} by {organizer}", e.event_name)
    })
    .await;
    app.settle(&mut handle).await?;
    let event_id = first_id(app.events()).await?;

    // Validation
    let _ = app
        .events()
        .send(ResourceAction::Create {
            params: NewEventParams {
                event_name: String::new(),
                date: NaiveDate::from_ymd_opt(2025, 8, 1).context("invalid date")?,
                location: None,
                description: String::new(),
                organizer_id: RecordId::optimistic(),
            },
        })
        .await?;
    let errors = app
        .events()
        .state(|state| state.editor.errors().map(ToString::to_string))
        .await;
    println!("\n3. Invalid event rejected before it was applied: {}", errors.unwrap_or_default());

    // Publication toggle
    if let Some(mut handle) = app.toggle_event_status(&event_id).await? {
        app.settle(&mut handle).await?;
    }
    println!("\n4. Event published; public listing:");
    for event in app.public_events().await? {
        println!("   {} ({})", event.event_name, event.status);
    }

    // Children
    let mut handle = app
        .group_of_tickets()
        .send(ResourceAction::Create {
            params: NewGroupOfTicketParams {
                name: "Early birds".to_string(),
                ticket_type: "standard".to_string(),
                quantity: 100,
                event_id: event_id.clone(),
            },
        })
        .await?;
    app.settle(&mut handle).await?;

    let mut handle = app
        .check_in_sections()
        .send(ResourceAction::Create {
            params: NewCheckInSectionParams {
                name: "North gate".to_string(),
                description: "Follow the blue signs".to_string(),
                check_in_at: NaiveDateTime::parse_from_str("2025-07-14 18:00:00", "%Y-%m-%d %H:%M:%S")?,
                event_id: event_id.clone(),
            },
        })
        .await?;
    app.settle(&mut handle).await?;

    let group_id = first_id(app.group_of_tickets()).await?;
    let section_id = first_id(app.check_in_sections()).await?;

    let mut handle = app.tickets().send(ResourceAction::LoadReferences).await?;
    app.settle(&mut handle).await?;
    let mut handle = app
        .tickets()
        .send(ResourceAction::Create {
            params: NewTicketParams {
                name: "Ada".to_string(),
                user_mail: "ada@example.com".to_string(),
                check_in_section_id: section_id,
                group_of_ticket_id: group_id,
                note: None,
            },
        })
        .await?;
    app.settle(&mut handle).await?;

    if let Some(detail) = app.event_detail(&event_id).await? {
        println!(
            "\n5. {} has {} group(s) of tickets and {} check-in section(s)",
            detail.event.event_name,
            detail.group_of_tickets.len(),
            detail.check_in_sections.len()
        );
    }
    print_rows(app.tickets(), |t| format!("{} <{}> {}", t.name, t.user_mail, t.status)).await;

    // Delete
    let mut handle = app.events().send(ResourceAction::Delete { id: event_id }).await?;
    println!("\n6. Event deleted, before persistence:");
    print_rows(app.events(), |e| e.event_name.clone()).await;
    app.settle(&mut handle).await?;
    let navigation = app.events().state(|state| state.navigation.clone()).await;
    println!("   navigate to {}", navigation.unwrap_or_default());

    let mut handle = app.group_of_tickets().send(ResourceAction::Load).await?;
    app.settle(&mut handle).await?;
    let mut handle = app.check_in_sections().send(ResourceAction::Load).await?;
    app.settle(&mut handle).await?;
    print_rows(app.group_of_tickets(), |g| g.name.clone()).await;
    print_rows(app.check_in_sections(), |s| s.name.clone()).await;

    let notifications = app
        .events()
        .state(|state| state.notifications.iter().map(|n| n.title.clone()).collect::<Vec<_>>())
        .await;
    println!("\nEvent notifications: {}", notifications.join(", "));

    app.shutdown().await?;
    println!("\n✓ Demo complete\n");
    Ok(())
}
