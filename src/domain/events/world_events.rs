//! World events - happenings reported by the protocol client
//!
//! Every event either maps to a notification payload (delivered to the
//! destinations subscribed to its kind) or is a correlated reply consumed
//! by a pending world query. Payload field names are fixed here, in one
//! place, rather than derived from type names at runtime.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{
    AgentId, CorrelationId, GroupId, KeyValueMessage, NotificationKind,
};

/// Which groups an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Only the named group's subscriptions apply.
    Group(GroupId),
    /// Every group's subscriptions apply.
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipChange {
    Joined,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipChange {
    Offered,
    Accepted,
    Terminated,
}

/// Everything the protocol client can report to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorldEvent {
    /// A line of local chat near the presence
    LocalChat {
        agent: AgentId,
        name: String,
        message: String,
        channel: i32,
    },
    /// A direct instant message to the presence
    InstantMessage {
        agent: AgentId,
        name: String,
        message: String,
    },
    /// A group chat line
    GroupMessage {
        group: GroupId,
        agent: AgentId,
        name: String,
        message: String,
    },
    /// A group notice
    GroupNotice {
        group: GroupId,
        name: String,
        subject: String,
        message: String,
    },
    /// A region-wide message from the simulator
    RegionMessage { region: String, message: String },
    /// A viewer alert from the simulator
    Alert { message: String },
    /// The presence's balance changed
    Balance { balance: i64 },
    /// Someone joined or left a group the presence belongs to
    Membership {
        group: GroupId,
        agent: AgentId,
        name: String,
        change: MembershipChange,
    },
    /// A friendship offer or state change
    Friendship {
        agent: AgentId,
        name: String,
        change: FriendshipChange,
    },
    /// An inventory item offered to the presence
    InventoryOffer {
        agent: AgentId,
        name: String,
        item: String,
        asset_type: String,
    },
    /// A script asked for runtime permissions
    ScriptPermission {
        item: String,
        name: String,
        permissions: String,
    },
    /// A teleport lure sent to the presence
    TeleportLure {
        agent: AgentId,
        name: String,
        message: String,
    },
    /// A script dialog shown to the presence
    ScriptDialog {
        item: String,
        name: String,
        channel: i32,
        message: String,
        buttons: Vec<String>,
    },
    /// A restrained-love command addressed to the presence
    Rlv {
        source: AgentId,
        behaviour: String,
        option: String,
        param: String,
    },
    /// Reply to a pending group-powers query (bridge traffic, never dispatched)
    GroupRolesReply {
        correlation: CorrelationId,
        agent: AgentId,
        powers: u64,
    },
    /// Reply to a pending agent name lookup (bridge traffic, never dispatched)
    AgentLookupReply {
        correlation: CorrelationId,
        agent: Option<AgentId>,
    },
}

impl WorldEvent {
    pub fn scope(&self) -> EventScope {
        match self {
            WorldEvent::GroupMessage { group, .. }
            | WorldEvent::GroupNotice { group, .. }
            | WorldEvent::Membership { group, .. } => EventScope::Group(*group),
            _ => EventScope::World,
        }
    }

    /// Build the notification payload for this event, or `None` for bridge
    /// replies. Every payload carries the kind name and an RFC 3339 stamp.
    pub fn notification(&self) -> Option<(NotificationKind, KeyValueMessage)> {
        let (kind, mut message): (NotificationKind, KeyValueMessage) = match self {
            WorldEvent::LocalChat {
                agent,
                name,
                message,
                channel,
            } => (
                NotificationKind::LocalChat,
                [
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    ("message", message.clone()),
                    ("channel", channel.to_string()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::InstantMessage {
                agent,
                name,
                message,
            } => (
                NotificationKind::InstantMessage,
                [
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    ("message", message.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::GroupMessage {
                group,
                agent,
                name,
                message,
            } => (
                NotificationKind::GroupMessage,
                [
                    ("group", group.to_string()),
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    ("message", message.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::GroupNotice {
                group,
                name,
                subject,
                message,
            } => (
                NotificationKind::GroupNotice,
                [
                    ("group", group.to_string()),
                    ("name", name.clone()),
                    ("subject", subject.clone()),
                    ("message", message.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::RegionMessage { region, message } => (
                NotificationKind::RegionMessage,
                [("region", region.clone()), ("message", message.clone())]
                    .into_iter()
                    .collect(),
            ),
            WorldEvent::Alert { message } => (
                NotificationKind::Alert,
                [("message", message.clone())].into_iter().collect(),
            ),
            WorldEvent::Balance { balance } => (
                NotificationKind::Balance,
                [("balance", balance.to_string())].into_iter().collect(),
            ),
            WorldEvent::Membership {
                group,
                agent,
                name,
                change,
            } => (
                NotificationKind::Membership,
                [
                    ("group", group.to_string()),
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    (
                        "action",
                        match change {
                            MembershipChange::Joined => "joined".to_string(),
                            MembershipChange::Left => "left".to_string(),
                        },
                    ),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::Friendship {
                agent,
                name,
                change,
            } => (
                NotificationKind::Friendship,
                [
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    (
                        "action",
                        match change {
                            FriendshipChange::Offered => "offered".to_string(),
                            FriendshipChange::Accepted => "accepted".to_string(),
                            FriendshipChange::Terminated => "terminated".to_string(),
                        },
                    ),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::InventoryOffer {
                agent,
                name,
                item,
                asset_type,
            } => (
                NotificationKind::Inventory,
                [
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    ("item", item.clone()),
                    ("asset", asset_type.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::ScriptPermission {
                item,
                name,
                permissions,
            } => (
                NotificationKind::ScriptPermission,
                [
                    ("item", item.clone()),
                    ("name", name.clone()),
                    ("permissions", permissions.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::TeleportLure {
                agent,
                name,
                message,
            } => (
                NotificationKind::TeleportLure,
                [
                    ("agent", agent.to_string()),
                    ("name", name.clone()),
                    ("message", message.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::ScriptDialog {
                item,
                name,
                channel,
                message,
                buttons,
            } => (
                NotificationKind::ScriptDialog,
                [
                    ("item", item.clone()),
                    ("name", name.clone()),
                    ("channel", channel.to_string()),
                    ("message", message.clone()),
                    ("buttons", buttons.join(",")),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::Rlv {
                source,
                behaviour,
                option,
                param,
            } => (
                NotificationKind::Rlv,
                [
                    ("source", source.to_string()),
                    ("behaviour", behaviour.clone()),
                    ("option", option.clone()),
                    ("param", param.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            WorldEvent::GroupRolesReply { .. } | WorldEvent::AgentLookupReply { .. } => {
                return None
            }
        };

        message.push("notification", kind.name());
        message.push("time", Utc::now().to_rfc3339());
        Some((kind, message))
    }
}
