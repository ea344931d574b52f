//! World link - HTTP adapter to the virtual-world protocol client
//!
//! The protocol client owns the wire protocol; this adapter speaks to its
//! HTTP surface. Plain operations are one request/response. Queries
//! (group powers, agent lookup) are asynchronous on the wire: the request
//! is acknowledged immediately and the answer arrives later as a
//! correlated reply event on the ingress, which `resolve_reply` feeds back
//! into the pending bridge entry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::application::ports::outbound::{WorldError, WorldPort};
use crate::application::sync::ReplyBridge;
use crate::domain::events::WorldEvent;
use crate::domain::value_objects::{AgentId, CorrelationId, GroupId, GroupPowerSet};

pub struct WorldLink {
    client: Client,
    base_url: String,
    power_replies: ReplyBridge<GroupPowerSet>,
    lookup_replies: ReplyBridge<Option<AgentId>>,
}

#[derive(Debug, thiserror::Error)]
pub enum WorldLinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("world link answered {0}")]
    Status(reqwest::StatusCode),
}

impl From<WorldLinkError> for WorldError {
    fn from(err: WorldLinkError) -> Self {
        WorldError::Transport(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct LocalChatRequest<'a> {
    channel: i32,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct InstantMessageRequest<'a> {
    agent: AgentId,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct GroupChatRequest<'a> {
    group: GroupId,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct EjectRequest {
    group: GroupId,
    agent: AgentId,
}

#[derive(Debug, Serialize)]
struct PowersRequest {
    group: GroupId,
    agent: AgentId,
    correlation: CorrelationId,
}

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    name: &'a str,
    correlation: CorrelationId,
}

impl WorldLink {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            power_replies: ReplyBridge::new(),
            lookup_replies: ReplyBridge::new(),
        }
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<(), WorldLinkError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WorldLinkError::Status(response.status()));
        }
        Ok(())
    }

    /// Feed a correlated reply event into its pending query. Returns
    /// whether the event was bridge traffic (and therefore must not be
    /// dispatched as a notification).
    pub fn resolve_reply(&self, event: &WorldEvent) -> bool {
        match event {
            WorldEvent::GroupRolesReply {
                correlation,
                powers,
                ..
            } => {
                if !self.power_replies.complete(*correlation, GroupPowerSet(*powers)) {
                    tracing::debug!("Ignoring stale group roles reply {}", correlation);
                }
                true
            }
            WorldEvent::AgentLookupReply { correlation, agent } => {
                if !self.lookup_replies.complete(*correlation, *agent) {
                    tracing::debug!("Ignoring stale agent lookup reply {}", correlation);
                }
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl WorldPort for WorldLink {
    async fn say_local(&self, channel: i32, message: &str) -> Result<(), WorldError> {
        Ok(self
            .post("chat/local", &LocalChatRequest { channel, message })
            .await?)
    }

    async fn send_instant_message(&self, agent: AgentId, message: &str) -> Result<(), WorldError> {
        Ok(self
            .post("chat/im", &InstantMessageRequest { agent, message })
            .await?)
    }

    async fn send_group_message(&self, group: GroupId, message: &str) -> Result<(), WorldError> {
        Ok(self
            .post("chat/group", &GroupChatRequest { group, message })
            .await?)
    }

    async fn agent_powers(
        &self,
        group: GroupId,
        agent: AgentId,
        deadline: Duration,
    ) -> Result<GroupPowerSet, WorldError> {
        let correlation = CorrelationId::new();
        // Register before issuing the request so a fast reply cannot slip
        // past the bridge.
        let pending = self.power_replies.register(correlation);
        self.post(
            "group/powers",
            &PowersRequest {
                group,
                agent,
                correlation,
            },
        )
        .await
        .map_err(WorldError::from)?;

        pending
            .wait(deadline)
            .await
            .map_err(|_| WorldError::Timeout("group powers"))
    }

    async fn lookup_agent(
        &self,
        name: &str,
        deadline: Duration,
    ) -> Result<Option<AgentId>, WorldError> {
        let correlation = CorrelationId::new();
        let pending = self.lookup_replies.register(correlation);
        self.post("agents/lookup", &LookupRequest { name, correlation })
            .await
            .map_err(WorldError::from)?;

        pending
            .wait(deadline)
            .await
            .map_err(|_| WorldError::Timeout("agent lookup"))
    }

    async fn eject_agent(&self, group: GroupId, agent: AgentId) -> Result<(), WorldError> {
        Ok(self.post("group/eject", &EjectRequest { group, agent }).await?)
    }
}
