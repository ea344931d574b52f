//! Command router - verb lookup, permission checks, result rendering
//!
//! Each registered handler declares the capability it requires and,
//! optionally, the in-world group power the presence must hold. The gate
//! runs before the handler ever executes, so a denied command has no side
//! effects. Every failure a handler raises is caught here, exactly once,
//! and rendered as the `error` entry of the result map; nothing escapes to
//! the ingress as a fault.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::application::dto::CommandInvocation;
use crate::application::ports::outbound::{KeyValueStorePort, WorldPort};
use crate::application::services::notification_registry::NotificationRegistry;
use crate::application::services::permission_gate::PermissionGate;
use crate::domain::entities::Group;
use crate::domain::errors::CommandError;
use crate::domain::value_objects::{AgentId, Capability, GroupPower, KeyValueMessage};

/// Everything a handler may touch. One context per invocation; handlers
/// share no mutable state outside the group-keyed locks.
pub struct CommandContext {
    pub group: Arc<Group>,
    pub invocation: CommandInvocation,
    /// The presence's own agent id, used for group-power checks.
    pub self_agent: AgentId,
    pub world: Arc<dyn WorldPort>,
    pub gate: Arc<PermissionGate>,
    pub registry: Arc<NotificationRegistry>,
    pub store: Arc<dyn KeyValueStorePort>,
    /// Deadline applied to bounded world queries made on this invocation.
    pub services_deadline: Duration,
}

pub type HandlerResult = Result<KeyValueMessage, CommandError>;

type BoxedHandler =
    Box<dyn Fn(CommandContext) -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> + Send + Sync>;

struct CommandHandler {
    capability: Capability,
    power: Option<GroupPower>,
    run: BoxedHandler,
}

/// Verb table built once at startup.
#[derive(Default)]
pub struct CommandRouter {
    handlers: HashMap<&'static str, CommandHandler>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, gated on `capability` and, when
    /// given, on the presence holding `power` in the calling group.
    pub fn register<F, Fut>(
        &mut self,
        name: &'static str,
        capability: Capability,
        power: Option<GroupPower>,
        handler: F,
    ) where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.insert(
            name,
            CommandHandler {
                capability,
                power,
                run: Box::new(
                    move |context| -> Pin<Box<dyn Future<Output = HandlerResult> + Send>> {
                        Box::pin(handler(context))
                    },
                ),
            },
        );
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run one invocation to completion and render its result map.
    pub async fn dispatch(&self, context: CommandContext) -> KeyValueMessage {
        let group_name = context.group.name.clone();
        let name = context.invocation.command_name().map(str::to_string);

        let mut result = KeyValueMessage::new();
        if let Some(name) = &name {
            result.push("command", name.clone());
        }

        let outcome = match &name {
            Some(name) => self.execute(name, context).await,
            None => Err(CommandError::missing("command")),
        };

        match outcome {
            Ok(output) => {
                result.push("success", "true");
                for (key, value) in output.iter() {
                    result.push(key, value);
                }
            }
            Err(err) => {
                tracing::warn!(
                    "Command {} for group {} failed: {}",
                    name.as_deref().unwrap_or("<unnamed>"),
                    group_name,
                    err
                );
                result.push("success", "false");
                result.push("error", err.kind());
            }
        }
        result
    }

    async fn execute(&self, name: &str, context: CommandContext) -> HandlerResult {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        // Local capability first; a denial here must not cost a network
        // round trip.
        context.gate.check(&context.group, handler.capability)?;

        if let Some(power) = handler.power {
            context
                .gate
                .check_power(
                    &context.group,
                    context.self_agent,
                    power,
                    context.services_deadline,
                )
                .await?;
        }

        (handler.run)(context).await
    }
}
