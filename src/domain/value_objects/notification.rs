//! Notification kinds and the per-group notification mask
//!
//! The mask is always derived from the registry's destination sets; it is
//! never stored on its own, so it cannot go stale.

use serde::{Deserialize, Serialize};

/// The closed set of world happenings a group can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    LocalChat,
    InstantMessage,
    GroupMessage,
    GroupNotice,
    RegionMessage,
    Alert,
    Balance,
    Membership,
    Friendship,
    Inventory,
    ScriptPermission,
    TeleportLure,
    ScriptDialog,
    Rlv,
}

/// Static name table; the wire names used by the notify command and in
/// delivered payloads.
const KIND_NAMES: &[(NotificationKind, &str)] = &[
    (NotificationKind::LocalChat, "local"),
    (NotificationKind::InstantMessage, "message"),
    (NotificationKind::GroupMessage, "group"),
    (NotificationKind::GroupNotice, "notice"),
    (NotificationKind::RegionMessage, "region"),
    (NotificationKind::Alert, "alert"),
    (NotificationKind::Balance, "balance"),
    (NotificationKind::Membership, "membership"),
    (NotificationKind::Friendship, "friendship"),
    (NotificationKind::Inventory, "inventory"),
    (NotificationKind::ScriptPermission, "permission"),
    (NotificationKind::TeleportLure, "lure"),
    (NotificationKind::ScriptDialog, "dialog"),
    (NotificationKind::Rlv, "rlv"),
];

impl NotificationKind {
    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    pub fn name(self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(k, _)| *k == self)
            .map(|(_, n)| *n)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        KIND_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(k, _)| *k)
    }

    pub fn all() -> impl Iterator<Item = NotificationKind> {
        KIND_NAMES.iter().map(|(k, _)| *k)
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set of kinds a group currently has at least one destination for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationMask(u32);

impl NotificationMask {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, kind: NotificationKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: NotificationKind) {
        self.0 |= kind.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        NotificationKind::all().filter(|k| self.contains(*k)).collect()
    }
}
