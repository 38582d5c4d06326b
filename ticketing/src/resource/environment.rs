//! Dependencies injected into the resource reducer.

use crate::auth::Principal;
use crate::persistence::{ReferenceSource, Repository};
use crate::records::Resource;
use optimistic_core::environment::Clock;
use std::sync::Arc;

/// Everything one resource store needs from the outside world
pub struct ResourceEnvironment<R: Resource> {
    /// Storage for the resource
    pub repository: Arc<dyn Repository<R>>,
    /// Storage for the resource's parent list
    pub references: Arc<dyn ReferenceSource<R::Parent>>,
    /// Who every request acts as
    pub principal: Principal,
    /// Stamps notifications
    pub clock: Arc<dyn Clock>,
    /// Suppress the notifications and editor effects of stale responses (on by default)
    pub sequencing: bool,
}

impl<R: Resource> ResourceEnvironment<R> {
    /// Creates an environment with request sequencing on
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository<R>>,
        references: Arc<dyn ReferenceSource<R::Parent>>,
        principal: Principal,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            references,
            principal,
            clock,
            sequencing: true,
        }
    }

    /// Turns request sequencing on or off
    #[must_use]
    pub const fn with_sequencing(mut self, sequencing: bool) -> Self {
        self.sequencing = sequencing;
        self
    }
}

impl<R: Resource> Clone for ResourceEnvironment<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            references: Arc::clone(&self.references),
            principal: self.principal.clone(),
            clock: Arc::clone(&self.clock),
            sequencing: self.sequencing,
        }
    }
}
