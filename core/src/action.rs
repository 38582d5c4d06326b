//! Optimistic actions.
//!
//! On the wire an action is `{ "action": "create" | "update" | "delete", "data": { ... } }`.
//! Anything that does not decode into one of the three known shapes becomes
//! [`OptimisticAction::Unrecognized`], which the reconciler ignores.

use crate::record::{Record, RecordId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Tag of a known optimistic action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

impl ActionKind {
    /// Wire tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An intended mutation, applied locally before the persistence call
#[derive(Clone, Debug, PartialEq)]
pub enum OptimisticAction<R: Record> {
    /// Append a provisional row built from the insert payload
    Create(R::Draft),

    /// Merge `patch` over the row whose id is `id`
    Update {
        /// Target row
        id: RecordId,
        /// Fields that win over the existing row
        patch: R::Patch,
    },

    /// Mark the row whose id is `id` as being deleted
    Delete {
        /// Target row
        id: RecordId,
    },

    /// Unknown or malformed action, kept only for logging
    Unrecognized {
        /// The tag as received
        tag: String,
    },
}

impl<R: Record> OptimisticAction<R> {
    /// The action's tag, `None` for unrecognized actions
    #[must_use]
    pub const fn kind(&self) -> Option<ActionKind> {
        match self {
            Self::Create(_) => Some(ActionKind::Create),
            Self::Update { .. } => Some(ActionKind::Update),
            Self::Delete { .. } => Some(ActionKind::Delete),
            Self::Unrecognized { .. } => None,
        }
    }

    /// The id of the existing row this action targets
    #[must_use]
    pub const fn target(&self) -> Option<&RecordId> {
        match self {
            Self::Update { id, .. } | Self::Delete { id } => Some(id),
            Self::Create(_) | Self::Unrecognized { .. } => None,
        }
    }
}

#[derive(Deserialize)]
struct WireAction {
    action: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct WireTarget {
    id: RecordId,
}

impl<R> OptimisticAction<R>
where
    R: Record,
    R::Draft: DeserializeOwned,
    R::Patch: DeserializeOwned,
{
    /// Decodes the `{ action, data }` wire form
    ///
    /// Never fails: a missing tag, an unknown tag or a payload that does not
    /// match the tag's shape all produce [`OptimisticAction::Unrecognized`].
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        let Ok(wire) = serde_json::from_value::<WireAction>(value) else {
            return Self::Unrecognized { tag: String::new() };
        };

        let decoded = match wire.action.as_str() {
            "create" => serde_json::from_value(wire.data).ok().map(Self::Create),
            "update" => {
                let target = serde_json::from_value::<WireTarget>(wire.data.clone()).ok();
                let patch = serde_json::from_value::<R::Patch>(wire.data).ok();
                target
                    .zip(patch)
                    .map(|(target, patch)| Self::Update { id: target.id, patch })
            }
            "delete" => serde_json::from_value::<WireTarget>(wire.data)
                .ok()
                .map(|target| Self::Delete { id: target.id }),
            _ => None,
        };

        decoded.unwrap_or(Self::Unrecognized { tag: wire.action })
    }
}
