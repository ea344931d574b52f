//! Outbound notification work items
//!
//! One element per destination per event. Elements are immutable; the
//! dispatcher builds them and the matching transport consumes each exactly
//! once.

use crate::domain::value_objects::{GroupId, KeyValueMessage};

/// One HTTP delivery: the event payload with the destination's afterburn
/// fields already appended.
#[derive(Debug, Clone)]
pub struct NotificationQueueElement {
    pub group: GroupId,
    pub url: String,
    pub payload: KeyValueMessage,
}

/// One TCP delivery of the bare event payload.
#[derive(Debug, Clone)]
pub struct NotificationTcpQueueElement {
    pub group: GroupId,
    /// `host:port` of the listening consumer.
    pub endpoint: String,
    pub payload: KeyValueMessage,
}
