//! Principals and session resolution.
//!
//! Every repository call takes the acting [`Principal`] as an argument.
//! Nothing reads an ambient session: the principal is resolved once from a
//! session token through an [`Authenticator`] and passed down explicitly.

use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// The authenticated user a mutation is performed for
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Owner id written on created rows and matched on update/delete
    pub user_id: UserId,
    /// Email of the signed-in user
    pub email: String,
}

impl Principal {
    /// Creates a principal
    #[must_use]
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
        }
    }
}

/// Authentication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session for the supplied token
    #[error("Unauthenticated")]
    Unauthenticated,

    /// The session backend could not be reached
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves session tokens to principals
pub trait Authenticator: Send + Sync {
    /// The principal behind `token`, `None` when there is no such session
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unavailable`] if the session backend fails.
    fn current_user(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<Principal>, AuthError>> + Send;
}

/// Resolves `token` or fails with [`AuthError::Unauthenticated`]
///
/// # Errors
///
/// - [`AuthError::Unauthenticated`]: no session for `token`
/// - [`AuthError::Unavailable`]: the session backend failed
pub async fn check_auth<A: Authenticator>(auth: &A, token: &str) -> Result<Principal, AuthError> {
    match auth.current_user(token).await? {
        Some(principal) => Ok(principal),
        None => {
            tracing::debug!("Rejected request without a valid session");
            Err(AuthError::Unauthenticated)
        },
    }
}

/// In-memory session table
///
/// Used by tests and the demo binary in place of a real session store.
#[derive(Debug, Default)]
pub struct StaticAuthenticator {
    sessions: RwLock<HashMap<String, Principal>>,
}

impl StaticAuthenticator {
    /// Creates an empty session table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session
    pub fn sign_in(&self, token: impl Into<String>, principal: Principal) {
        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.insert(token.into(), principal);
    }

    /// Removes a session
    pub fn sign_out(&self, token: &str) {
        let mut sessions = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.remove(token);
    }
}

impl Authenticator for StaticAuthenticator {
    async fn current_user(&self, token: &str) -> Result<Option<Principal>, AuthError> {
        let sessions = match self.sessions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(sessions.get(token).cloned())
    }
}
