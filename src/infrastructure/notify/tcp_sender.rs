//! TCP notification transport
//!
//! One connection per queue element, one newline-terminated encoded
//! payload per connection. The encoding escapes newlines inside values,
//! so the line is the frame.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::application::dto::NotificationTcpQueueElement;
use crate::application::ports::outbound::{DeliveryError, TcpDeliveryPort};

pub struct TcpNotificationSender {
    timeout: Duration,
}

impl TcpNotificationSender {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TcpDeliveryPort for TcpNotificationSender {
    async fn deliver(&self, element: &NotificationTcpQueueElement) -> Result<(), DeliveryError> {
        let send = async {
            let mut stream = TcpStream::connect(&element.endpoint).await?;
            stream.write_all(element.payload.encode().as_bytes()).await?;
            stream.write_all(b"\n").await?;
            stream.shutdown().await?;
            Ok::<(), std::io::Error>(())
        };

        tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| DeliveryError::new("connection timed out"))?
            .map_err(|err| DeliveryError::new(err.to_string()))
    }
}
