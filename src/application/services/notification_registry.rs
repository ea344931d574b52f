//! Notification registry - per-group subscription tables
//!
//! Maps notification kind to the HTTP destinations (URL plus afterburn
//! fields) and TCP endpoints a group has registered. The subscription mask
//! is derived from the destination sets on every read, never stored, so it
//! cannot disagree with them. All operations touching one group's table
//! run under that group's keyed lock.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::application::sync::GroupKeyedLock;
use crate::domain::value_objects::{GroupId, NotificationKind, NotificationMask};

/// An HTTP destination with its afterburn fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDestination {
    pub url: String,
    /// Extra key-value fields appended to every payload delivered here.
    pub afterburn: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct GroupSubscriptions {
    http: HashMap<NotificationKind, Vec<HttpDestination>>,
    tcp: HashMap<NotificationKind, BTreeSet<String>>,
}

impl GroupSubscriptions {
    /// Union of kinds with at least one destination of either transport.
    fn mask(&self) -> NotificationMask {
        let mut mask = NotificationMask::empty();
        for (kind, destinations) in &self.http {
            if !destinations.is_empty() {
                mask.insert(*kind);
            }
        }
        for (kind, endpoints) in &self.tcp {
            if !endpoints.is_empty() {
                mask.insert(*kind);
            }
        }
        mask
    }
}

pub struct NotificationRegistry {
    locks: Arc<GroupKeyedLock>,
    groups: RwLock<HashMap<GroupId, GroupSubscriptions>>,
}

impl NotificationRegistry {
    pub fn new(locks: Arc<GroupKeyedLock>) -> Self {
        Self {
            locks,
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Register an HTTP destination for `kind`. Re-adding a URL that is
    /// already registered is a no-op.
    pub async fn subscribe_http(
        &self,
        group: GroupId,
        kind: NotificationKind,
        destination: HttpDestination,
    ) {
        let _guard = self.locks.acquire(group).await;
        let mut groups = self.groups.write().await;
        let destinations = groups
            .entry(group)
            .or_default()
            .http
            .entry(kind)
            .or_default();
        if !destinations.iter().any(|d| d.url == destination.url) {
            destinations.push(destination);
        }
    }

    /// Register a TCP endpoint for `kind`. Idempotent.
    pub async fn subscribe_tcp(&self, group: GroupId, kind: NotificationKind, endpoint: String) {
        let _guard = self.locks.acquire(group).await;
        let mut groups = self.groups.write().await;
        groups
            .entry(group)
            .or_default()
            .tcp
            .entry(kind)
            .or_default()
            .insert(endpoint);
    }

    /// Remove an HTTP destination by URL. Removing the kind's last
    /// destination drops the kind from the mask in the same critical
    /// section.
    pub async fn unsubscribe_http(&self, group: GroupId, kind: NotificationKind, url: &str) {
        let _guard = self.locks.acquire(group).await;
        let mut groups = self.groups.write().await;
        if let Some(subscriptions) = groups.get_mut(&group) {
            if let Some(destinations) = subscriptions.http.get_mut(&kind) {
                destinations.retain(|d| d.url != url);
                if destinations.is_empty() {
                    subscriptions.http.remove(&kind);
                }
            }
        }
    }

    /// Remove a TCP endpoint.
    pub async fn unsubscribe_tcp(&self, group: GroupId, kind: NotificationKind, endpoint: &str) {
        let _guard = self.locks.acquire(group).await;
        let mut groups = self.groups.write().await;
        if let Some(subscriptions) = groups.get_mut(&group) {
            if let Some(endpoints) = subscriptions.tcp.get_mut(&kind) {
                endpoints.remove(endpoint);
                if endpoints.is_empty() {
                    subscriptions.tcp.remove(&kind);
                }
            }
        }
    }

    /// Drop every destination a group holds for `kind`.
    pub async fn clear(&self, group: GroupId, kind: NotificationKind) {
        let _guard = self.locks.acquire(group).await;
        let mut groups = self.groups.write().await;
        if let Some(subscriptions) = groups.get_mut(&group) {
            subscriptions.http.remove(&kind);
            subscriptions.tcp.remove(&kind);
        }
    }

    /// The group's current mask, derived from its destination sets.
    pub async fn mask(&self, group: GroupId) -> NotificationMask {
        let _guard = self.locks.acquire(group).await;
        let groups = self.groups.read().await;
        groups
            .get(&group)
            .map(GroupSubscriptions::mask)
            .unwrap_or_default()
    }

    /// Snapshot the destinations for `kind` iff the kind is in the group's
    /// mask, in one critical section. A destination removed concurrently is
    /// either fully present in the snapshot or fully absent, never halfway.
    pub async fn destinations_if_subscribed(
        &self,
        group: GroupId,
        kind: NotificationKind,
    ) -> Option<(Vec<HttpDestination>, Vec<String>)> {
        let _guard = self.locks.acquire(group).await;
        let groups = self.groups.read().await;
        let subscriptions = groups.get(&group)?;
        if !subscriptions.mask().contains(kind) {
            return None;
        }
        let http = subscriptions.http.get(&kind).cloned().unwrap_or_default();
        let tcp = subscriptions
            .tcp
            .get(&kind)
            .map(|endpoints| endpoints.iter().cloned().collect())
            .unwrap_or_default();
        Some((http, tcp))
    }

    /// Ids of every group whose mask currently contains `kind`.
    ///
    /// Used for world-scoped events; the per-group mask is re-checked under
    /// that group's lock at delivery time.
    pub async fn groups_subscribed_to(&self, kind: NotificationKind) -> Vec<GroupId> {
        let groups = self.groups.read().await;
        groups
            .iter()
            .filter(|(_, subscriptions)| subscriptions.mask().contains(kind))
            .map(|(id, _)| *id)
            .collect()
    }
}
