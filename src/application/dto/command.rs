//! Command invocation - one inbound command, from arrival to result

use crate::domain::value_objects::{CorrelationId, GroupId, KeyValueMessage};

/// A single parsed command submitted on behalf of a group.
///
/// Created when the command arrives, dropped once the result map has been
/// produced. The correlation id ties any world queries the handler makes
/// back to this invocation.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub group: GroupId,
    pub message: KeyValueMessage,
    pub correlation: CorrelationId,
}

impl CommandInvocation {
    pub fn new(group: GroupId, message: KeyValueMessage) -> Self {
        Self {
            group,
            message,
            correlation: CorrelationId::new(),
        }
    }

    /// The command verb, if the message names one.
    pub fn command_name(&self) -> Option<&str> {
        self.message.get("command")
    }
}
