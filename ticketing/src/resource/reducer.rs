//! Reducer driving one optimistic resource list.

use super::{ResourceAction, ResourceEnvironment, ResourceState};
use super::types::{EditSurface, Notification, RequestToken};
use crate::persistence::PersistenceError;
use crate::records::Resource;
use crate::validation::{ValidationError, Validator, target_id};
use optimistic_core::{ActionKind, OptimisticAction, effect::Effect, reducer::Reducer};
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use std::sync::Arc;

type Effects<R> = SmallVec<[Effect<ResourceAction<R>>; 4]>;

/// Applies mutations to the derived view before persisting them
///
/// A submitted mutation is validated, folded into the derived view, and
/// sent to the repository as a future effect. Whatever the outcome, the
/// response is followed by a full list read that re-seeds the view.
pub struct ResourceReducer<R> {
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceReducer<R> {
    /// Creates the reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _resource: PhantomData,
        }
    }

    fn submit(
        state: &mut ResourceState<R>,
        mutation: OptimisticAction<R>,
        env: &ResourceEnvironment<R>,
    ) -> Effects<R> {
        let Some(kind) = mutation.kind() else {
            if let OptimisticAction::Unrecognized { tag } = &mutation {
                tracing::warn!(resource = R::NAME, tag = %tag, "Ignored unrecognized action");
            }
            return SmallVec::new();
        };

        if let Err(errors) = Self::validate(&mutation) {
            tracing::debug!(resource = R::NAME, kind = %kind, %errors, "Rejected invalid input");
            state.editor = EditSurface::Open {
                attempted: Some(mutation),
                errors: Some(errors),
            };
            return SmallVec::new();
        }

        state.editor = EditSurface::Closed;
        state.reconciler.dispatch(&mutation);
        let token = state.sequencer.begin(mutation.target());

        metrics::counter!("reconciler.mutations", "resource" => R::NAME, "kind" => kind.as_str())
            .increment(1);
        tracing::info!(resource = R::NAME, kind = %kind, token = %token, "Applied optimistic mutation");

        smallvec![Self::persist(env, mutation, token)]
    }

    fn validate(mutation: &OptimisticAction<R>) -> Result<(), ValidationError> {
        match mutation {
            OptimisticAction::Create(draft) => R::validate_draft(draft),
            OptimisticAction::Update { id, patch } => Validator::new()
                .check(target_id(id))
                .check(R::validate_patch(patch))
                .finish(),
            OptimisticAction::Delete { id } => target_id(id),
            OptimisticAction::Unrecognized { .. } => Ok(()),
        }
    }

    fn persist(
        env: &ResourceEnvironment<R>,
        mutation: OptimisticAction<R>,
        token: RequestToken,
    ) -> Effect<ResourceAction<R>> {
        let repository = Arc::clone(&env.repository);
        let principal = env.principal.clone();

        Effect::future(async move {
            let outcome = match &mutation {
                OptimisticAction::Create(draft) => {
                    repository.create(&principal, draft.clone()).await.map(drop)
                },
                OptimisticAction::Update { id, patch } => {
                    repository.update(&principal, id, patch.clone()).await.map(drop)
                },
                OptimisticAction::Delete { id } => repository.delete(&principal, id).await.map(drop),
                OptimisticAction::Unrecognized { .. } => Ok(()),
            };

            Some(match outcome {
                Ok(()) => ResourceAction::MutationSucceeded { mutation, token },
                Err(error) => ResourceAction::MutationFailed {
                    mutation,
                    error,
                    token,
                },
            })
        })
    }

    fn reseed(state: &mut ResourceState<R>, env: &ResourceEnvironment<R>) -> Effect<ResourceAction<R>> {
        let token = state.sequencer.begin_read();
        state.loading = true;

        let repository = Arc::clone(&env.repository);
        let principal = env.principal.clone();

        Effect::future(async move {
            Some(match repository.list(&principal).await {
                Ok(rows) => ResourceAction::Reseeded { rows, token },
                Err(error) => ResourceAction::LoadFailed { error, token },
            })
        })
    }

    fn load_references(env: &ResourceEnvironment<R>) -> Effect<ResourceAction<R>> {
        let references = Arc::clone(&env.references);
        let principal = env.principal.clone();

        Effect::future(async move {
            Some(match references.load(&principal).await {
                Ok(references) => ResourceAction::ReferencesLoaded { references },
                Err(error) => ResourceAction::ReferencesFailed { error },
            })
        })
    }

    /// Settles a response; `false` when it is stale
    ///
    /// A stale response raises no notification and leaves the editor and
    /// navigation alone, but the list is still re-read: the superseded write
    /// may have reached the server after the newer one.
    fn settle(
        state: &mut ResourceState<R>,
        mutation: &OptimisticAction<R>,
        token: RequestToken,
        env: &ResourceEnvironment<R>,
    ) -> bool {
        let latest = state.sequencer.finish(mutation.target(), token);
        if latest || !env.sequencing {
            return true;
        }

        metrics::counter!("reconciler.stale_responses", "resource" => R::NAME).increment(1);
        tracing::debug!(resource = R::NAME, token = %token, "Stale response, re-reading list only");
        false
    }

    fn succeeded(
        state: &mut ResourceState<R>,
        mutation: &OptimisticAction<R>,
        kind: ActionKind,
        env: &ResourceEnvironment<R>,
    ) -> Effects<R> {
        tracing::info!(resource = R::NAME, kind = %kind, "Mutation persisted");

        state
            .notifications
            .push(Notification::success(format!("{} {kind}d!", R::NAME), env.clock.now()));
        if matches!(mutation, OptimisticAction::Delete { .. }) {
            state.navigation = Some(R::LISTING_PATH.to_string());
        }

        smallvec![Self::reseed(state, env)]
    }

    fn failed(
        state: &mut ResourceState<R>,
        mutation: OptimisticAction<R>,
        kind: ActionKind,
        error: &PersistenceError,
        env: &ResourceEnvironment<R>,
    ) -> Effects<R> {
        let message = error.user_message();
        tracing::warn!(resource = R::NAME, kind = %kind, error = %message, "Mutation failed");

        state.notifications.push(Notification::error(
            format!("Failed to {kind}"),
            message.clone(),
            env.clock.now(),
        ));
        state.last_error = Some(message);
        state.editor = EditSurface::Open {
            attempted: Some(mutation),
            errors: None,
        };

        smallvec![Self::reseed(state, env)]
    }
}

impl<R: Resource> Default for ResourceReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ResourceReducer<R> {
    fn clone(&self) -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Reducer for ResourceReducer<R> {
    type State = ResourceState<R>;
    type Action = ResourceAction<R>;
    type Environment = ResourceEnvironment<R>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ResourceAction::Load => smallvec![Self::reseed(state, env)],

            ResourceAction::LoadReferences => smallvec![Self::load_references(env)],

            ResourceAction::Seed { rows } => {
                state.reconciler.reseed(rows);
                SmallVec::new()
            },

            ResourceAction::Create { params } => {
                Self::submit(state, OptimisticAction::Create(params), env)
            },

            ResourceAction::Update { id, params } => {
                Self::submit(state, OptimisticAction::Update { id, patch: params }, env)
            },

            ResourceAction::Delete { id } => Self::submit(state, OptimisticAction::Delete { id }, env),

            ResourceAction::Submit { action } => Self::submit(state, action, env),

            ResourceAction::OpenEditor { attempted } => {
                state.editor = EditSurface::Open {
                    attempted,
                    errors: None,
                };
                SmallVec::new()
            },

            ResourceAction::CloseEditor => {
                state.editor = EditSurface::Closed;
                SmallVec::new()
            },

            ResourceAction::DismissNotifications => {
                state.notifications.clear();
                SmallVec::new()
            },

            ResourceAction::Navigated => {
                state.navigation = None;
                SmallVec::new()
            },

            ResourceAction::Reseeded { rows, token } => {
                if state.sequencer.accept_read(token) || !env.sequencing {
                    tracing::debug!(resource = R::NAME, rows = rows.len(), token = %token, "Re-seeded list");
                    state.reconciler.reseed(rows);
                    state.loading = false;
                } else {
                    tracing::debug!(resource = R::NAME, token = %token, "Discarded stale list read");
                }
                SmallVec::new()
            },

            ResourceAction::LoadFailed { error, token } => {
                if state.sequencer.accept_read(token) || !env.sequencing {
                    tracing::warn!(resource = R::NAME, error = %error, "List read failed");
                    state.last_error = Some(error.user_message());
                    state.loading = false;
                }
                SmallVec::new()
            },

            ResourceAction::ReferencesLoaded { references } => {
                state.reconciler.set_references(references);
                SmallVec::new()
            },

            ResourceAction::ReferencesFailed { error } => {
                tracing::warn!(resource = R::NAME, error = %error, "Reference read failed");
                state.last_error = Some(error.user_message());
                SmallVec::new()
            },

            ResourceAction::MutationSucceeded { mutation, token } => {
                let Some(kind) = mutation.kind() else {
                    return SmallVec::new();
                };
                if !Self::settle(state, &mutation, token, env) {
                    return smallvec![Self::reseed(state, env)];
                }
                Self::succeeded(state, &mutation, kind, env)
            },

            ResourceAction::MutationFailed {
                mutation,
                error,
                token,
            } => {
                let Some(kind) = mutation.kind() else {
                    return SmallVec::new();
                };
                if !Self::settle(state, &mutation, token, env) {
                    return smallvec![Self::reseed(state, env)];
                }
                Self::failed(state, mutation, kind, &error, env)
            },
        }
    }
}
