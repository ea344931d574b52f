//! `database` command - the group's persistent key-value table
//!
//! `action=get|set|delete` with `key=` and, for set, `value=`. A get for
//! an absent key succeeds with no `value` entry; deleting an absent key is
//! a no-op.

use crate::application::services::{CommandContext, HandlerResult};
use crate::domain::errors::CommandError;
use crate::domain::value_objects::KeyValueMessage;

pub async fn run(context: CommandContext) -> HandlerResult {
    let message = &context.invocation.message;
    let action = message.get("action").ok_or(CommandError::missing("action"))?;
    let key = message.get("key").ok_or(CommandError::missing("key"))?;

    let mut output = KeyValueMessage::new();
    match action {
        "get" => {
            if let Some(value) = context.store.get(&context.group, key).await? {
                output.push("value", value);
            }
        }
        "set" => {
            let value = message.get("value").ok_or(CommandError::missing("value"))?;
            context.store.set(&context.group, key, value).await?;
        }
        "delete" => {
            context.store.delete(&context.group, key).await?;
        }
        other => {
            return Err(CommandError::Validation {
                argument: "action",
                reason: format!("unsupported action {other}"),
            })
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::application::dto::CommandInvocation;
    use crate::application::ports::outbound::{
        KeyValueStorePort, StoreError, WorldError, WorldPort,
    };
    use crate::application::services::{NotificationRegistry, PermissionGate};
    use crate::application::sync::GroupKeyedLock;
    use crate::domain::entities::Group;
    use crate::domain::value_objects::{
        AgentId, CapabilitySet, GroupId, GroupPowerSet,
    };

    struct MemoryStore {
        table: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl KeyValueStorePort for MemoryStore {
        async fn get(&self, _group: &Group, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.table.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, _group: &Group, key: &str, value: &str) -> Result<(), StoreError> {
            self.table
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, _group: &Group, key: &str) -> Result<(), StoreError> {
            self.table.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct IdleWorld;

    #[async_trait]
    impl WorldPort for IdleWorld {
        async fn say_local(&self, _channel: i32, _message: &str) -> Result<(), WorldError> {
            Ok(())
        }
        async fn send_instant_message(
            &self,
            _agent: AgentId,
            _message: &str,
        ) -> Result<(), WorldError> {
            Ok(())
        }
        async fn send_group_message(
            &self,
            _group: GroupId,
            _message: &str,
        ) -> Result<(), WorldError> {
            Ok(())
        }
        async fn agent_powers(
            &self,
            _group: GroupId,
            _agent: AgentId,
            _deadline: Duration,
        ) -> Result<GroupPowerSet, WorldError> {
            Ok(GroupPowerSet::default())
        }
        async fn lookup_agent(
            &self,
            _name: &str,
            _deadline: Duration,
        ) -> Result<Option<AgentId>, WorldError> {
            Ok(None)
        }
        async fn eject_agent(&self, _group: GroupId, _agent: AgentId) -> Result<(), WorldError> {
            Ok(())
        }
    }

    fn context(message: KeyValueMessage) -> CommandContext {
        let world: Arc<dyn WorldPort> = Arc::new(IdleWorld);
        let group = Arc::new(Group::new("Wardens", CapabilitySet::empty()));
        CommandContext {
            invocation: CommandInvocation::new(group.id, message),
            group,
            self_agent: AgentId::new(),
            gate: Arc::new(PermissionGate::new(world.clone())),
            world,
            registry: Arc::new(NotificationRegistry::new(Arc::new(GroupKeyedLock::new()))),
            store: Arc::new(MemoryStore {
                table: Mutex::new(HashMap::new()),
            }),
            services_deadline: Duration::from_secs(1),
        }
    }

    fn message(pairs: &[(&str, &str)]) -> KeyValueMessage {
        pairs.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let set_context = context(message(&[
            ("command", "database"),
            ("action", "set"),
            ("key", "greeting"),
            ("value", "hello"),
        ]));
        let store = set_context.store.clone();
        let group = set_context.group.clone();
        run(set_context).await.unwrap();

        let mut get_context = context(message(&[
            ("command", "database"),
            ("action", "get"),
            ("key", "greeting"),
        ]));
        get_context.store = store;
        get_context.group = group;
        let output = run(get_context).await.unwrap();
        assert_eq!(output.get("value"), Some("hello"));
    }

    #[tokio::test]
    async fn test_get_absent_key_is_success_without_value() {
        let output = run(context(message(&[
            ("command", "database"),
            ("action", "get"),
            ("key", "nothing"),
        ])))
        .await
        .unwrap();
        assert!(output.get("value").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_validation_error() {
        let err = run(context(message(&[("command", "database"), ("action", "get")])))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[tokio::test]
    async fn test_unsupported_action() {
        let err = run(context(message(&[
            ("command", "database"),
            ("action", "drop"),
            ("key", "x"),
        ])))
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }
}
