//! State of one resource screen.

use super::types::{EditSurface, Notification, RequestSequencer};
use crate::records::Resource;
use optimistic_core::{Reconciler, RowStatus};

/// The list, its edit surface and what the UI should show next
#[derive(Clone, Debug)]
pub struct ResourceState<R: Resource> {
    /// Authoritative and derived lists
    pub reconciler: Reconciler<R>,
    /// Create/edit modal
    pub editor: EditSurface<R>,
    /// Toasts, oldest first
    pub notifications: Vec<Notification>,
    /// Where the UI should navigate, set after a delete
    pub navigation: Option<String>,
    /// Message of the last failed read or mutation
    pub last_error: Option<String>,
    /// A list read is outstanding
    pub loading: bool,
    /// Request ordering
    pub sequencer: RequestSequencer,
}

impl<R: Resource> ResourceState<R> {
    /// State seeded with an authoritative list
    #[must_use]
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            reconciler: Reconciler::new(rows),
            editor: EditSurface::Closed,
            notifications: Vec::new(),
            navigation: None,
            last_error: None,
            loading: false,
            sequencer: RequestSequencer::new(),
        }
    }

    /// The derived list with a render status per row
    pub fn rows(&self) -> impl Iterator<Item = (&R, RowStatus)> {
        self.reconciler.rows()
    }

    /// The derived list
    #[must_use]
    pub fn derived(&self) -> &[R] {
        self.reconciler.derived()
    }

    /// The most recent notification
    #[must_use]
    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    /// No optimistic rows and no mutation awaiting its response
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.reconciler.is_settled() && self.sequencer.in_flight() == 0
    }
}

impl<R: Resource> Default for ResourceState<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
