//! HTTP notification transport
//!
//! One POST per queue element; the body is the payload in the same
//! key-value encoding commands use. A non-2xx answer counts as a failed
//! delivery like any connection error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::application::dto::NotificationQueueElement;
use crate::application::ports::outbound::{DeliveryError, HttpDeliveryPort};

pub struct HttpNotificationSender {
    client: Client,
    timeout: Duration,
}

impl HttpNotificationSender {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl HttpDeliveryPort for HttpNotificationSender {
    async fn deliver(&self, element: &NotificationQueueElement) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&element.url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(element.payload.encode())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| DeliveryError::new(err.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::new(format!(
                "destination answered {}",
                response.status()
            )));
        }
        Ok(())
    }
}
