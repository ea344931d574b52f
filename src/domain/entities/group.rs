//! Group entity - the administrative scope commands run under
//!
//! A group carries its configured capability bitmask and, optionally, the
//! file name of its key-value store. Groups are loaded from the roster at
//! startup and live for the life of the process.

use serde::Deserialize;

use crate::domain::value_objects::{CapabilitySet, GroupId};

/// An administrative scope with its own permissions and store.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Local capability bits this group has been granted.
    pub capabilities: CapabilitySet,
    /// File name of the group's key-value store, relative to the data dir.
    /// `None` means the group has no store configured.
    pub store_file: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            capabilities,
            store_file: None,
        }
    }

    pub fn with_store_file(mut self, file_name: impl Into<String>) -> Self {
        self.store_file = Some(file_name.into());
        self
    }
}

/// One entry of the roster file loaded at startup.
#[derive(Debug, Deserialize)]
pub struct GroupRecord {
    pub uuid: uuid::Uuid,
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub store: Option<String>,
}

impl GroupRecord {
    /// Resolve capability names into a group, rejecting unknown names so a
    /// typo in the roster fails loudly at startup instead of denying
    /// commands at runtime.
    pub fn into_group(self) -> Result<Group, String> {
        let capabilities =
            CapabilitySet::from_names(self.capabilities.iter().map(String::as_str))
                .map_err(|unknown| format!("group {}: unknown capability {unknown}", self.name))?;
        Ok(Group {
            id: GroupId::from_uuid(self.uuid),
            name: self.name,
            capabilities,
            store_file: self.store,
        })
    }
}
