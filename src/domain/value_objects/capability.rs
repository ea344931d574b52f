//! Capability bits and in-world group powers
//!
//! A capability is a local permission flag configured per group; it gates
//! which commands that group may invoke. A group power is an in-world role
//! capability reported by the world itself, checked in addition to the
//! local bit for moderation commands.

use serde::{Deserialize, Serialize};

/// Local permission flags a group can hold, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Movement,
    Economy,
    Land,
    Grooming,
    Inventory,
    Interact,
    Mute,
    Database,
    Notifications,
    Talk,
    Directory,
    System,
    Friendship,
    Group,
}

/// Static name table; the wire and roster names for each bit.
const CAPABILITY_NAMES: &[(Capability, &str)] = &[
    (Capability::Movement, "movement"),
    (Capability::Economy, "economy"),
    (Capability::Land, "land"),
    (Capability::Grooming, "grooming"),
    (Capability::Inventory, "inventory"),
    (Capability::Interact, "interact"),
    (Capability::Mute, "mute"),
    (Capability::Database, "database"),
    (Capability::Notifications, "notifications"),
    (Capability::Talk, "talk"),
    (Capability::Directory, "directory"),
    (Capability::System, "system"),
    (Capability::Friendship, "friendship"),
    (Capability::Group, "group"),
];

impl Capability {
    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    pub fn name(self) -> &'static str {
        CAPABILITY_NAMES
            .iter()
            .find(|(c, _)| *c == self)
            .map(|(_, n)| *n)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CAPABILITY_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(c, _)| *c)
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A set of capability bits attached to a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    /// Build a set from roster capability names, rejecting unknown ones.
    pub fn from_names<'a, I>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = Self::empty();
        for name in names {
            match Capability::from_name(name) {
                Some(capability) => set.insert(capability),
                None => return Err(name.to_string()),
            }
        }
        Ok(set)
    }

    pub fn names(&self) -> Vec<&'static str> {
        CAPABILITY_NAMES
            .iter()
            .filter(|(c, _)| self.contains(*c))
            .map(|(_, n)| *n)
            .collect()
    }
}

/// In-world group role powers, a subset of the world's 64-bit power mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupPower {
    Invite,
    Eject,
    Ban,
    RoleProperties,
    AssignMember,
    RemoveMember,
    ChangeIdentity,
    SendNotices,
    ModerateChat,
}

const GROUP_POWER_BITS: &[(GroupPower, u64, &str)] = &[
    (GroupPower::Invite, 1 << 1, "invite"),
    (GroupPower::Eject, 1 << 6, "eject"),
    (GroupPower::Ban, 1 << 51, "ban"),
    (GroupPower::RoleProperties, 1 << 26, "roleproperties"),
    (GroupPower::AssignMember, 1 << 27, "assignmember"),
    (GroupPower::RemoveMember, 1 << 48, "removemember"),
    (GroupPower::ChangeIdentity, 1 << 35, "changeidentity"),
    (GroupPower::SendNotices, 1 << 42, "sendnotices"),
    (GroupPower::ModerateChat, 1 << 37, "moderatechat"),
];

impl GroupPower {
    pub fn bit(self) -> u64 {
        GROUP_POWER_BITS
            .iter()
            .find(|(p, _, _)| *p == self)
            .map(|(_, b, _)| *b)
            .unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        GROUP_POWER_BITS
            .iter()
            .find(|(p, _, _)| *p == self)
            .map(|(_, _, n)| *n)
            .unwrap_or("unknown")
    }
}

impl std::fmt::Display for GroupPower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The raw power mask an agent holds in a group, as reported by the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupPowerSet(pub u64);

impl GroupPowerSet {
    pub fn contains(&self, power: GroupPower) -> bool {
        self.0 & power.bit() != 0
    }
}
