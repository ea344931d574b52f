//! Delivery ports - Interfaces for the notification transports
//!
//! One implementation per transport; the dispatcher treats both uniformly
//! and contains each destination's failure on its own.

use async_trait::async_trait;

use crate::application::dto::{NotificationQueueElement, NotificationTcpQueueElement};

/// A single delivery attempt failed. Deliveries are not retried; the
/// failure is logged and the destination stays subscribed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("delivery failed: {reason}")]
pub struct DeliveryError {
    pub reason: String,
}

impl DeliveryError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outbound HTTP notification delivery.
#[async_trait]
pub trait HttpDeliveryPort: Send + Sync {
    async fn deliver(&self, element: &NotificationQueueElement) -> Result<(), DeliveryError>;
}

/// Outbound TCP notification delivery.
#[async_trait]
pub trait TcpDeliveryPort: Send + Sync {
    async fn deliver(&self, element: &NotificationTcpQueueElement) -> Result<(), DeliveryError>;
}
