//! Resource lifecycle: one optimistic list per record kind.
//!
//! ```text
//! Create/Update/Delete ──► validate ──✗──► editor reopened with errors
//!                             │
//!                             ✓
//!                             ▼
//!          derived view patched, token issued, Effect::Future(repository)
//!                             │
//!            MutationSucceeded / MutationFailed
//!                             │
//!            notification, navigation or editor reopen (skipped when stale)
//!                             ▼
//!                 Effect::Future(list) ──► Reseeded
//! ```
//!
//! The reducer never talks to storage directly; it returns effects and the
//! runtime [`Store`](optimistic_runtime::Store) feeds their results back.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use actions::ResourceAction;
pub use environment::ResourceEnvironment;
pub use reducer::ResourceReducer;
pub use state::ResourceState;
pub use types::{EditSurface, Notification, NotificationLevel, RequestSequencer, RequestToken};

use optimistic_runtime::Store;

/// The runtime store for one resource
pub type ResourceStore<R> =
    Store<ResourceState<R>, ResourceAction<R>, ResourceEnvironment<R>, ResourceReducer<R>>;
