//! Shared application state

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::commands;
use crate::application::dto::CommandInvocation;
use crate::application::ports::outbound::KeyValueStorePort;
use crate::application::services::{
    CommandContext, CommandRouter, NotificationDispatcher, NotificationRegistry, PermissionGate,
};
use crate::application::sync::GroupKeyedLock;
use crate::domain::entities::{Group, GroupRecord};
use crate::domain::value_objects::GroupId;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::notify::{HttpNotificationSender, TcpNotificationSender};
use crate::infrastructure::persistence::FlatFileKeyValueStore;
use crate::infrastructure::world_link::WorldLink;

/// The groups loaded from the roster, resolvable by id or name.
pub struct GroupDirectory {
    groups: HashMap<GroupId, Arc<Group>>,
    by_name: HashMap<String, GroupId>,
}

impl GroupDirectory {
    pub fn from_records(records: Vec<GroupRecord>) -> Result<Self> {
        let mut groups = HashMap::new();
        let mut by_name = HashMap::new();
        for record in records {
            let group = record.into_group().map_err(anyhow::Error::msg)?;
            by_name.insert(group.name.to_lowercase(), group.id);
            groups.insert(group.id, Arc::new(group));
        }
        Ok(Self { groups, by_name })
    }

    /// Resolve a roster group from either its uuid or its name.
    pub fn resolve(&self, reference: &str) -> Option<Arc<Group>> {
        if let Ok(id) = reference.parse::<GroupId>() {
            return self.groups.get(&id).cloned();
        }
        self.by_name
            .get(&reference.to_lowercase())
            .and_then(|id| self.groups.get(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub directory: GroupDirectory,
    /// Concrete world link; also consumes correlated reply events
    pub world: Arc<WorldLink>,
    pub gate: Arc<PermissionGate>,
    pub registry: Arc<NotificationRegistry>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub store: Arc<dyn KeyValueStorePort>,
    pub router: CommandRouter,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Load the group roster
        let roster = tokio::fs::read_to_string(&config.groups_file)
            .await
            .with_context(|| format!("failed to read {}", config.groups_file.display()))?;
        let records: Vec<GroupRecord> =
            serde_json::from_str(&roster).context("failed to parse group roster")?;
        let directory = GroupDirectory::from_records(records)?;

        // One keyed-lock registry shared by everything group-scoped
        let locks = Arc::new(GroupKeyedLock::new());

        let world = Arc::new(WorldLink::new(&config.world_link_url));
        let gate = Arc::new(PermissionGate::new(world.clone()));
        let registry = Arc::new(NotificationRegistry::new(locks.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            registry.clone(),
            Arc::new(HttpNotificationSender::new(config.notify_timeout)),
            Arc::new(TcpNotificationSender::new(config.notify_timeout)),
        ));
        let store: Arc<dyn KeyValueStorePort> =
            Arc::new(FlatFileKeyValueStore::new(&config.data_dir, locks));

        let mut router = CommandRouter::new();
        commands::register_all(&mut router);

        Ok(Self {
            config,
            directory,
            world,
            gate,
            registry,
            dispatcher,
            store,
            router,
        })
    }

    /// Assemble the per-invocation context handed to the router.
    pub fn command_context(&self, group: Arc<Group>, invocation: CommandInvocation) -> CommandContext {
        CommandContext {
            group,
            invocation,
            self_agent: self.config.self_agent,
            world: self.world.clone(),
            gate: self.gate.clone(),
            registry: self.registry.clone(),
            store: self.store.clone(),
            services_deadline: self.config.services_timeout,
        }
    }
}
