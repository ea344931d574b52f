//! `tell` command - relay a message into the world
//!
//! `entity=local|agent|group` picks the channel: local chat (optional
//! `channel=` number), an agent IM (`agent=<uuid>`), or the calling
//! group's chat.

use crate::application::services::{CommandContext, HandlerResult};
use crate::domain::errors::CommandError;
use crate::domain::value_objects::{AgentId, KeyValueMessage};

pub async fn run(context: CommandContext) -> HandlerResult {
    let message = &context.invocation.message;
    let text = message.get("message").ok_or(CommandError::missing("message"))?;
    let entity = message.get("entity").unwrap_or("local");

    match entity {
        "local" => {
            let channel = match message.get("channel") {
                Some(raw) => raw.parse::<i32>().map_err(|_| CommandError::Validation {
                    argument: "channel",
                    reason: "not a channel number".to_string(),
                })?,
                None => 0,
            };
            context.world.say_local(channel, text).await?;
        }
        "agent" => {
            let agent: AgentId = message
                .get("agent")
                .ok_or(CommandError::missing("agent"))?
                .parse()
                .map_err(|_| CommandError::Validation {
                    argument: "agent",
                    reason: "not a valid UUID".to_string(),
                })?;
            context.world.send_instant_message(agent, text).await?;
        }
        "group" => {
            context
                .world
                .send_group_message(context.group.id, text)
                .await?;
        }
        other => {
            return Err(CommandError::Validation {
                argument: "entity",
                reason: format!("unsupported entity {other}"),
            })
        }
    }
    Ok(KeyValueMessage::new())
}

#[cfg(test)]
mod tests {
    use super::*;
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
    use crate::domain::value_objects::{CapabilitySet, GroupId, GroupPowerSet};

    #[derive(Default)]
    struct EchoWorld {
        local: Mutex<Vec<(i32, String)>>,
        ims: Mutex<Vec<(AgentId, String)>>,
        group_lines: Mutex<Vec<(GroupId, String)>>,
    }

    #[async_trait]
    impl WorldPort for EchoWorld {
        async fn say_local(&self, channel: i32, message: &str) -> Result<(), WorldError> {
            self.local.lock().unwrap().push((channel, message.to_string()));
            Ok(())
        }
        async fn send_instant_message(
            &self,
            agent: AgentId,
            message: &str,
        ) -> Result<(), WorldError> {
            self.ims.lock().unwrap().push((agent, message.to_string()));
            Ok(())
        }
        async fn send_group_message(
            &self,
            group: GroupId,
            message: &str,
        ) -> Result<(), WorldError> {
            self.group_lines
                .lock()
                .unwrap()
                .push((group, message.to_string()));
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

    struct NullStore;

    #[async_trait]
    impl KeyValueStorePort for NullStore {
        async fn get(&self, _group: &Group, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unconfigured)
        }
        async fn set(&self, _group: &Group, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unconfigured)
        }
        async fn delete(&self, _group: &Group, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unconfigured)
        }
    }

    fn context(world: Arc<EchoWorld>, message: KeyValueMessage) -> CommandContext {
        let group = Arc::new(Group::new("Wardens", CapabilitySet::empty()));
        CommandContext {
            invocation: CommandInvocation::new(group.id, message),
            group,
            self_agent: AgentId::new(),
            gate: Arc::new(PermissionGate::new(world.clone())),
            world,
            registry: Arc::new(NotificationRegistry::new(Arc::new(GroupKeyedLock::new()))),
            store: Arc::new(NullStore),
            services_deadline: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_local_defaults_to_channel_zero() {
        let world = Arc::new(EchoWorld::default());
        let message: KeyValueMessage = [("command", "tell"), ("message", "hello there")]
            .into_iter()
            .collect();

        run(context(world.clone(), message)).await.unwrap();
        assert_eq!(
            *world.local.lock().unwrap(),
            vec![(0, "hello there".to_string())]
        );
    }

    #[tokio::test]
    async fn test_group_entity_uses_calling_group() {
        let world = Arc::new(EchoWorld::default());
        let message: KeyValueMessage = [
            ("command", "tell"),
            ("entity", "group"),
            ("message", "meeting at noon"),
        ]
        .into_iter()
        .collect();

        let run_context = context(world.clone(), message);
        let group = run_context.group.id;
        run(run_context).await.unwrap();

        assert_eq!(
            *world.group_lines.lock().unwrap(),
            vec![(group, "meeting at noon".to_string())]
        );
    }

    #[tokio::test]
    async fn test_agent_entity_requires_agent() {
        let world = Arc::new(EchoWorld::default());
        let message: KeyValueMessage = [
            ("command", "tell"),
            ("entity", "agent"),
            ("message", "psst"),
        ]
        .into_iter()
        .collect();

        let err = run(context(world, message)).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[tokio::test]
    async fn test_bad_channel_is_validation_error() {
        let world = Arc::new(EchoWorld::default());
        let message: KeyValueMessage = [
            ("command", "tell"),
            ("channel", "loud"),
            ("message", "hello"),
        ]
        .into_iter()
        .collect();

        let err = run(context(world, message)).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }
}
