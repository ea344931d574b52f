//! Command error taxonomy
//!
//! Handlers raise one `CommandError`; the router catches it exactly once
//! and renders the kind name into the result map. The kind names are part
//! of the wire contract.

use crate::domain::value_objects::{Capability, GroupPower};

/// The entity classes a handler can fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    Agent,
    Role,
    Item,
    Region,
    Parcel,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Group => "group",
            EntityKind::Agent => "agent",
            EntityKind::Role => "role",
            EntityKind::Item => "item",
            EntityKind::Region => "region",
            EntityKind::Parcel => "parcel",
        };
        write!(f, "{name}")
    }
}

/// Every way a command invocation can fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("group lacks the {0} capability")]
    PermissionDenied(Capability),

    #[error("caller lacks the {0} group power")]
    GroupPowerDenied(GroupPower),

    #[error("timed out waiting for {0}")]
    TimedOut(&'static str),

    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    #[error("invalid or missing argument {argument}: {reason}")]
    Validation {
        argument: &'static str,
        reason: String,
    },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("no key-value store configured for this group")]
    StorageUnavailable,

    #[error("delivery to {destination} failed: {reason}")]
    TransportFailure {
        destination: String,
        reason: String,
    },
}

impl CommandError {
    /// Wire name of this error kind, reported under the `error` result key.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::PermissionDenied(_) => "PermissionDenied",
            CommandError::GroupPowerDenied(_) => "GroupPowerDenied",
            CommandError::TimedOut(_) => "TimedOut",
            CommandError::NotFound { .. } => "NotFound",
            CommandError::Validation { .. } => "ValidationError",
            CommandError::UnknownCommand(_) => "UnknownCommand",
            CommandError::StorageUnavailable => "StorageUnavailable",
            CommandError::TransportFailure { .. } => "TransportFailure",
        }
    }

    /// Shorthand for a missing required argument.
    pub fn missing(argument: &'static str) -> Self {
        CommandError::Validation {
            argument,
            reason: "required".to_string(),
        }
    }
}
