//! `notify` command - manage the group's notification subscriptions
//!
//! `action=add|remove|clear|list`. Destinations are `url=` for HTTP or
//! `tcp=host:port`. Invocation fields that are not part of the command
//! grammar ride along as the HTTP destination's afterburn and come back
//! attached to every payload delivered there.

use crate::application::services::notification_registry::HttpDestination;
use crate::application::services::{CommandContext, HandlerResult};
use crate::domain::errors::CommandError;
use crate::domain::value_objects::{KeyValueMessage, NotificationKind};

/// Keys consumed by the command grammar; everything else is afterburn.
const RESERVED_KEYS: &[&str] = &["command", "group", "action", "type", "url", "tcp"];

fn required_kind(message: &KeyValueMessage) -> Result<NotificationKind, CommandError> {
    let name = message.get("type").ok_or(CommandError::missing("type"))?;
    NotificationKind::from_name(name).ok_or_else(|| CommandError::Validation {
        argument: "type",
        reason: format!("unknown notification type {name}"),
    })
}

fn afterburn(message: &KeyValueMessage) -> Vec<(String, String)> {
    message
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(key))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub async fn run(context: CommandContext) -> HandlerResult {
    let message = &context.invocation.message;
    let group = context.group.id;
    let action = message.get("action").ok_or(CommandError::missing("action"))?;

    let mut output = KeyValueMessage::new();
    match action {
        "add" => {
            let kind = required_kind(message)?;
            if let Some(url) = message.get("url") {
                context
                    .registry
                    .subscribe_http(
                        group,
                        kind,
                        HttpDestination {
                            url: url.to_string(),
                            afterburn: afterburn(message),
                        },
                    )
                    .await;
            } else if let Some(endpoint) = message.get("tcp") {
                if !endpoint.contains(':') {
                    return Err(CommandError::Validation {
                        argument: "tcp",
                        reason: "expected host:port".to_string(),
                    });
                }
                context
                    .registry
                    .subscribe_tcp(group, kind, endpoint.to_string())
                    .await;
            } else {
                return Err(CommandError::Validation {
                    argument: "url",
                    reason: "a url or tcp destination is required".to_string(),
                });
            }
        }
        "remove" => {
            let kind = required_kind(message)?;
            if let Some(url) = message.get("url") {
                context.registry.unsubscribe_http(group, kind, url).await;
            } else if let Some(endpoint) = message.get("tcp") {
                context.registry.unsubscribe_tcp(group, kind, endpoint).await;
            } else {
                return Err(CommandError::Validation {
                    argument: "url",
                    reason: "a url or tcp destination is required".to_string(),
                });
            }
        }
        "clear" => {
            let kind = required_kind(message)?;
            context.registry.clear(group, kind).await;
        }
        "list" => {
            let mask = context.registry.mask(group).await;
            let names: Vec<&str> = mask.kinds().iter().map(|kind| kind.name()).collect();
            output.push("notifications", names.join(","));
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
