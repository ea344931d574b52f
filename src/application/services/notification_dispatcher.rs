//! Notification dispatcher - fans world events out to destinations
//!
//! The mask check and the destination snapshot happen in one critical
//! section, so a destination removed mid-flight is either delivered to or
//! skipped, never half-built. Deliveries are independent: each destination
//! gets its own future, failures are logged and contained per destination,
//! nothing is retried, and a failing destination stays subscribed. The
//! event producer never waits on delivery.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::join_all;

use crate::application::dto::{NotificationQueueElement, NotificationTcpQueueElement};
use crate::application::ports::outbound::{HttpDeliveryPort, TcpDeliveryPort};
use crate::application::services::notification_registry::NotificationRegistry;
use crate::domain::events::{EventScope, WorldEvent};
use crate::domain::value_objects::{GroupId, KeyValueMessage, NotificationKind};

/// Outcome tally for one event's deliveries to one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    registry: Arc<NotificationRegistry>,
    http: Arc<dyn HttpDeliveryPort>,
    tcp: Arc<dyn TcpDeliveryPort>,
}

impl NotificationDispatcher {
    pub fn new(
        registry: Arc<NotificationRegistry>,
        http: Arc<dyn HttpDeliveryPort>,
        tcp: Arc<dyn TcpDeliveryPort>,
    ) -> Self {
        Self {
            registry,
            http,
            tcp,
        }
    }

    /// Route a world event to every group it concerns, without blocking the
    /// caller on delivery.
    pub fn dispatch_event(&self, event: &WorldEvent) {
        let Some((kind, message)) = event.notification() else {
            return;
        };
        match event.scope() {
            EventScope::Group(group) => self.dispatch(group, kind, message),
            EventScope::World => {
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    let groups = dispatcher.registry.groups_subscribed_to(kind).await;
                    for group in groups {
                        dispatcher.dispatch_now(group, kind, message.clone()).await;
                    }
                });
            }
        }
    }

    /// Fire-and-forget delivery of one event to one group's destinations.
    pub fn dispatch(&self, group: GroupId, kind: NotificationKind, message: KeyValueMessage) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.dispatch_now(group, kind, message).await;
        });
    }

    /// Deliver to every destination the group holds for `kind`, awaiting
    /// the whole batch. No-op when the kind is not in the group's mask.
    pub async fn dispatch_now(
        &self,
        group: GroupId,
        kind: NotificationKind,
        message: KeyValueMessage,
    ) -> DeliveryReport {
        let Some((http_destinations, tcp_endpoints)) = self
            .registry
            .destinations_if_subscribed(group, kind)
            .await
        else {
            return DeliveryReport::default();
        };

        let mut message = message;
        if !message.contains_key("group") {
            message.push("group", group.to_string());
        }

        let mut deliveries: Vec<Pin<Box<dyn Future<Output = bool> + Send>>> = Vec::new();
        for destination in http_destinations {
            let mut payload = message.clone();
            for (key, value) in &destination.afterburn {
                payload.push(key.clone(), value.clone());
            }
            let element = NotificationQueueElement {
                group,
                url: destination.url,
                payload,
            };
            let http = self.http.clone();
            deliveries.push(Box::pin(async move {
                match http.deliver(&element).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(
                            "Notification delivery to {} failed: {}",
                            element.url,
                            err
                        );
                        false
                    }
                }
            }));
        }
        for endpoint in tcp_endpoints {
            let element = NotificationTcpQueueElement {
                group,
                endpoint,
                payload: message.clone(),
            };
            let tcp = self.tcp.clone();
            deliveries.push(Box::pin(async move {
                match tcp.deliver(&element).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::warn!(
                            "Notification delivery to {} failed: {}",
                            element.endpoint,
                            err
                        );
                        false
                    }
                }
            }));
        }

        let outcomes = join_all(deliveries).await;
        let delivered = outcomes.iter().filter(|ok| **ok).count();
        DeliveryReport {
            delivered,
            failed: outcomes.len() - delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::application::ports::outbound::DeliveryError;
    use crate::application::services::notification_registry::HttpDestination;
    use crate::application::sync::GroupKeyedLock;

    /// HTTP port that records elements and can be told to fail.
    #[derive(Default)]
    struct RecordingHttp {
        sent: Mutex<Vec<NotificationQueueElement>>,
        fail: bool,
    }

    #[async_trait]
    impl HttpDeliveryPort for RecordingHttp {
        async fn deliver(&self, element: &NotificationQueueElement) -> Result<(), DeliveryError> {
            if self.fail {
                return Err(DeliveryError::new("connection refused"));
            }
            self.sent
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(element.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingTcp {
        sent: Mutex<Vec<NotificationTcpQueueElement>>,
    }

    #[async_trait]
    impl TcpDeliveryPort for RecordingTcp {
        async fn deliver(
            &self,
            element: &NotificationTcpQueueElement,
        ) -> Result<(), DeliveryError> {
            self.sent
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(element.clone());
            Ok(())
        }
    }

    fn fixture(
        fail_http: bool,
    ) -> (
        Arc<NotificationRegistry>,
        Arc<RecordingHttp>,
        Arc<RecordingTcp>,
        NotificationDispatcher,
    ) {
        let registry = Arc::new(NotificationRegistry::new(Arc::new(GroupKeyedLock::new())));
        let http = Arc::new(RecordingHttp {
            fail: fail_http,
            ..Default::default()
        });
        let tcp = Arc::new(RecordingTcp::default());
        let dispatcher =
            NotificationDispatcher::new(registry.clone(), http.clone(), tcp.clone());
        (registry, http, tcp, dispatcher)
    }

    fn chat_message() -> KeyValueMessage {
        [("notification", "local"), ("message", "hello")]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_unsubscribed_kind_is_a_no_op() {
        let (_registry, http, _tcp, dispatcher) = fixture(false);
        let report = dispatcher
            .dispatch_now(GroupId::new(), NotificationKind::LocalChat, chat_message())
            .await;

        assert_eq!(report, DeliveryReport::default());
        assert!(http.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_afterburn_is_appended_per_destination() {
        let (registry, http, _tcp, dispatcher) = fixture(false);
        let group = GroupId::new();

        registry
            .subscribe_http(
                group,
                NotificationKind::LocalChat,
                HttpDestination {
                    url: "http://a.example/hook".to_string(),
                    afterburn: vec![("secret".to_string(), "burn".to_string())],
                },
            )
            .await;

        let report = dispatcher
            .dispatch_now(group, NotificationKind::LocalChat, chat_message())
            .await;
        assert_eq!(report.delivered, 1);

        let sent = http.sent.lock().unwrap();
        assert_eq!(sent[0].url, "http://a.example/hook");
        assert_eq!(sent[0].payload.get("secret"), Some("burn"));
        assert_eq!(sent[0].payload.get("message"), Some("hello"));
        assert_eq!(sent[0].payload.get("group"), Some(group.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_failing_http_does_not_block_tcp() {
        let (registry, _http, tcp, dispatcher) = fixture(true);
        let group = GroupId::new();

        registry
            .subscribe_http(
                group,
                NotificationKind::LocalChat,
                HttpDestination {
                    url: "http://dead.example/hook".to_string(),
                    afterburn: Vec::new(),
                },
            )
            .await;
        registry
            .subscribe_tcp(
                group,
                NotificationKind::LocalChat,
                "relay.example:7700".to_string(),
            )
            .await;

        let report = dispatcher
            .dispatch_now(group, NotificationKind::LocalChat, chat_message())
            .await;

        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        let sent = tcp.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, "relay.example:7700");

        // The failing destination stays subscribed.
        assert!(registry
            .destinations_if_subscribed(group, NotificationKind::LocalChat)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_group_scoped_event_reaches_only_its_group() {
        let (registry, http, _tcp, dispatcher) = fixture(false);
        let subscribed = GroupId::new();
        let other = GroupId::new();

        for group in [subscribed, other] {
            registry
                .subscribe_http(
                    group,
                    NotificationKind::GroupMessage,
                    HttpDestination {
                        url: format!("http://{group}.example/"),
                        afterburn: Vec::new(),
                    },
                )
                .await;
        }

        let event = WorldEvent::GroupMessage {
            group: subscribed,
            agent: crate::domain::value_objects::AgentId::new(),
            name: "Visitor".to_string(),
            message: "hi".to_string(),
        };
        let (kind, message) = event.notification().unwrap();
        match event.scope() {
            EventScope::Group(group) => {
                dispatcher.dispatch_now(group, kind, message).await;
            }
            EventScope::World => panic!("group message must be group scoped"),
        }

        let sent = http.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, format!("http://{subscribed}.example/"));
    }
}
