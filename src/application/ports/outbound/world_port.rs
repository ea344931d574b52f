//! World port - Interface to the opaque virtual-world protocol client
//!
//! The protocol client owns the actual network stack (simulators, chat,
//! groups). Application services depend on this trait, not on the HTTP
//! adapter that implements it.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::CommandError;
use crate::domain::value_objects::{AgentId, GroupId, GroupPowerSet};

/// Failures crossing the world-link boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorldError {
    /// A correlated reply did not arrive within the deadline.
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// The request to the protocol client itself failed.
    #[error("world link request failed: {0}")]
    Transport(String),
}

impl From<WorldError> for CommandError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::Timeout(what) => CommandError::TimedOut(what),
            WorldError::Transport(reason) => CommandError::TransportFailure {
                destination: "world link".to_string(),
                reason,
            },
        }
    }
}

/// Operations the engine needs from the virtual world.
#[async_trait]
pub trait WorldPort: Send + Sync {
    /// Say a line on a local chat channel.
    async fn say_local(&self, channel: i32, message: &str) -> Result<(), WorldError>;

    /// Send an instant message to an agent.
    async fn send_instant_message(&self, agent: AgentId, message: &str) -> Result<(), WorldError>;

    /// Send a line to a group's chat.
    async fn send_group_message(&self, group: GroupId, message: &str) -> Result<(), WorldError>;

    /// Fetch the powers `agent` currently holds in `group`.
    ///
    /// Always a live query; results must not be cached across calls.
    async fn agent_powers(
        &self,
        group: GroupId,
        agent: AgentId,
        deadline: Duration,
    ) -> Result<GroupPowerSet, WorldError>;

    /// Resolve an agent's full name to an id. `Ok(None)` means the world
    /// answered and no such agent exists.
    async fn lookup_agent(
        &self,
        name: &str,
        deadline: Duration,
    ) -> Result<Option<AgentId>, WorldError>;

    /// Eject an agent from a group.
    async fn eject_agent(&self, group: GroupId, agent: AgentId) -> Result<(), WorldError>;
}
