//! `eject` command - remove an agent from the calling group
//!
//! Registered with the Group capability and the Eject group power; both
//! checks have already passed when this body runs. The target is either
//! `agent=<uuid>` or `name=<full name>` resolved through the world.

use crate::application::services::{CommandContext, HandlerResult};
use crate::domain::errors::{CommandError, EntityKind};
use crate::domain::value_objects::{AgentId, KeyValueMessage};

pub async fn run(context: CommandContext) -> HandlerResult {
    let message = &context.invocation.message;

    let agent: AgentId = if let Some(raw) = message.get("agent") {
        raw.parse().map_err(|_| CommandError::Validation {
            argument: "agent",
            reason: "not a valid UUID".to_string(),
        })?
    } else if let Some(name) = message.get("name") {
        context
            .world
            .lookup_agent(name, context.services_deadline)
            .await?
            .ok_or_else(|| CommandError::NotFound {
                kind: EntityKind::Agent,
                name: name.to_string(),
            })?
    } else {
        return Err(CommandError::missing("agent"));
    };

    context.world.eject_agent(context.group.id, agent).await?;

    let mut output = KeyValueMessage::new();
    output.push("agent", agent.to_string());
    Ok(output)
}
