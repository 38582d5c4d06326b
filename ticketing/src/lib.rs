//! Event ticketing with optimistic lists
//!
//! Organizers, events, groups of tickets, check-in sections and tickets are
//! each shown as a list that reflects a mutation the moment it is submitted,
//! before persistence confirms it. Every list is a runtime store driven by
//! [`resource::ResourceReducer`]:
//!
//! ```text
//! UI ──send──► Store ──reduce──► ResourceReducer
//!                                  │  validate, patch derived view
//!                                  ▼
//!                          Effect::Future ──► Repository (create/update/delete)
//!                                  │
//!                                  ▼
//!                          Effect::Future ──► Repository (list) ──► Reseeded
//! ```
//!
//! Rows still waiting on persistence carry a placeholder id (`optimistic`
//! while being created, `delete` while being removed) so the UI can render
//! them differently. The next list read replaces them with server state.
//!
//! # Usage
//!
//! ```ignore
//! let app = TicketingApp::connect(&backend, &authenticator, token, clock, &config).await?;
//! app.load().await?;
//! let mut handle = app.events().send(ResourceAction::Create { params }).await?;
//! app.settle(&mut handle).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod auth;
pub mod config;
pub mod persistence;
pub mod records;
pub mod resource;
pub mod types;
pub mod validation;

pub use app::{AppError, Backend, TicketingApp};
pub use config::Config;
pub use resource::{ResourceAction, ResourceState, ResourceStore};
pub use types::*;
