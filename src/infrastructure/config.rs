//! Application configuration

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::value_objects::AgentId;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the command/event ingress listens on
    pub bind_addr: SocketAddr,
    /// Base URL of the protocol client's HTTP surface
    pub world_link_url: String,
    /// The presence's own agent id, used for group-power checks
    pub self_agent: AgentId,
    /// Path to the group roster file
    pub groups_file: PathBuf,
    /// Directory holding per-group key-value store files
    pub data_dir: PathBuf,
    /// Deadline for correlated world queries
    pub services_timeout: Duration,
    /// Per-destination deadline for notification deliveries
    pub notify_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_addr: env::var("ENVOY_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3900".to_string())
                .parse()
                .context("ENVOY_BIND_ADDR must be a valid socket address")?,
            world_link_url: env::var("WORLD_LINK_URL")
                .context("WORLD_LINK_URL environment variable is required")?,
            self_agent: env::var("ENVOY_AGENT_UUID")
                .context("ENVOY_AGENT_UUID environment variable is required")?
                .parse()
                .context("ENVOY_AGENT_UUID must be a valid UUID")?,
            groups_file: env::var("ENVOY_GROUPS_FILE")
                .unwrap_or_else(|_| "groups.json".to_string())
                .into(),
            data_dir: env::var("ENVOY_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            services_timeout: Duration::from_millis(
                env::var("ENVOY_SERVICES_TIMEOUT_MS")
                    .unwrap_or_else(|_| "60000".to_string())
                    .parse()
                    .context("ENVOY_SERVICES_TIMEOUT_MS must be a number of milliseconds")?,
            ),
            notify_timeout: Duration::from_millis(
                env::var("ENVOY_NOTIFY_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("ENVOY_NOTIFY_TIMEOUT_MS must be a number of milliseconds")?,
            ),
        })
    }
}
