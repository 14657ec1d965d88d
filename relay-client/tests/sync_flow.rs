//! End-to-end synchronization: send → optimistic entry → ingest → poll/push
//! → single authoritative entry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use relay_client::config::ClientConfig;
use relay_client::fetcher::MessageFetcher;
use relay_client::push::{BroadcastPushChannel, StatusPushChannel};
use relay_client::sender::SmsSender;
use relay_client::MessagingClient;
use relay_core::config::RelayAppConfig;
use relay_core::error::RelayError;
use relay_core::model::{DeliveryStatus, Message, SendReceipt, StatusEvent};
use relay_core::utils::current_millis;
use relay_store::interface::api::StatusReadApi;
use relay_store::service;

const RECIPIENT: &str = "+15551234567";

struct ApiFetcher {
    api: Arc<StatusReadApi>,
}

#[async_trait]
impl MessageFetcher for ApiFetcher {
    async fn fetch_messages(&self, recipient: &str) -> relay_core::Result<Vec<Message>> {
        self.api.list_messages(recipient).await
    }
}

struct StubSender {
    correlation_id: String,
}

#[async_trait]
impl SmsSender for StubSender {
    async fn send(&self, _recipient: &str, _text: &str) -> relay_core::Result<SendReceipt> {
        Ok(SendReceipt {
            correlation_id: self.correlation_id.clone(),
            status: DeliveryStatus::Received,
            timestamp: current_millis(),
        })
    }
}

struct FailingSender;

#[async_trait]
impl SmsSender for FailingSender {
    async fn send(&self, _recipient: &str, _text: &str) -> relay_core::Result<SendReceipt> {
        Err(RelayError::StorageUnavailable("gateway offline".to_string()))
    }
}

fn assert_no_duplicate_keys(view: &[Message]) {
    let keys: HashSet<&str> = view.iter().map(|m| m.correlation_key()).collect();
    assert_eq!(keys.len(), view.len(), "duplicate visible entries: {view:?}");
}

#[tokio::test(start_paused = true)]
async fn send_converges_to_a_single_authoritative_entry_via_polling() {
    let context = service::initialize(&RelayAppConfig::default());
    let (publisher, consumer) = service::in_process_consumer(&context);
    tokio::spawn(async move { consumer.run().await });

    let client = MessagingClient::new(
        Arc::new(StubSender {
            correlation_id: "r1".to_string(),
        }),
        Arc::new(ApiFetcher {
            api: context.api.clone(),
        }),
        None,
        ClientConfig::default(),
    );

    let optimistic = client.send(RECIPIENT, "hi").await.unwrap();
    assert_eq!(optimistic.status, DeliveryStatus::Pending);
    assert_eq!(optimistic.correlation_id.as_deref(), Some("r1"));

    // the optimistic entry is visible before any server state exists
    let view = client.visible_messages(RECIPIENT).await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].status, DeliveryStatus::Pending);

    // the delivery outcome arrives out-of-band
    publisher
        .publish(&StatusEvent {
            correlation_id: "r1".to_string(),
            status: DeliveryStatus::Success,
            event_time: current_millis() + 1_000,
            recipient: Some(RECIPIENT.to_string()),
            text: Some("hi".to_string()),
        })
        .unwrap();

    // at no reconciliation step may the entry be duplicated
    let mut converged = false;
    for _ in 0..50 {
        let view = client.visible_messages(RECIPIENT).await;
        assert_no_duplicate_keys(&view);
        if view.len() == 1 && view[0].status == DeliveryStatus::Success {
            converged = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(converged, "optimistic entry never converged");

    let view = client.visible_messages(RECIPIENT).await;
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].status, DeliveryStatus::Success);
    assert!(view[0].id.starts_with("msg-"));
}

#[tokio::test(start_paused = true)]
async fn push_channel_delivers_without_polling() {
    let context = service::initialize(&RelayAppConfig::default());
    let (publisher, consumer) = service::in_process_consumer(&context);
    tokio::spawn(async move { consumer.run().await });

    let push: Arc<dyn StatusPushChannel> =
        Arc::new(BroadcastPushChannel::new(context.notifier.sender()));
    let client = MessagingClient::new(
        Arc::new(StubSender {
            correlation_id: "r2".to_string(),
        }),
        Arc::new(ApiFetcher {
            api: context.api.clone(),
        }),
        Some(push),
        ClientConfig::default(),
    );

    client.open_conversation(RECIPIENT).await;
    client.send(RECIPIENT, "hi").await.unwrap();

    publisher
        .publish(&StatusEvent {
            correlation_id: "r2".to_string(),
            status: DeliveryStatus::Success,
            event_time: current_millis() + 1_000,
            recipient: Some(RECIPIENT.to_string()),
            text: Some("hi".to_string()),
        })
        .unwrap();

    let mut converged = false;
    for _ in 0..50 {
        let view = client.visible_messages(RECIPIENT).await;
        assert_no_duplicate_keys(&view);
        if view.len() == 1 && view[0].status == DeliveryStatus::Success {
            converged = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(converged);

    client.close_conversation(RECIPIENT).await;
}

#[tokio::test(start_paused = true)]
async fn failed_send_preserves_the_input_for_retry() {
    let context = service::initialize(&RelayAppConfig::default());
    let client = MessagingClient::new(
        Arc::new(FailingSender),
        Arc::new(ApiFetcher {
            api: context.api.clone(),
        }),
        None,
        ClientConfig::default(),
    );

    let error = client.send(RECIPIENT, "important text").await.unwrap_err();
    assert_eq!(error.recipient, RECIPIENT);
    assert_eq!(error.text, "important text");

    // nothing optimistic was installed for the failed send
    assert!(client.visible_messages(RECIPIENT).await.is_empty());
}

#[tokio::test]
async fn stale_optimistic_entries_do_not_linger_as_phantoms() {
    let context = service::initialize(&RelayAppConfig::default());
    // no consumer: the send's event never arrives
    let config = ClientConfig {
        poll_delays: vec![Duration::from_millis(5), Duration::from_millis(10)],
        stale_after: Duration::from_millis(50),
        push_catchup_delay: Duration::from_millis(5),
        sender_base_url: None,
        read_api_base_url: None,
    };
    let client = MessagingClient::new(
        Arc::new(StubSender {
            correlation_id: "r3".to_string(),
        }),
        Arc::new(ApiFetcher {
            api: context.api.clone(),
        }),
        None,
        config,
    );

    client.send(RECIPIENT, "hi").await.unwrap();
    assert_eq!(client.visible_messages(RECIPIENT).await.len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client.visible_messages(RECIPIENT).await.is_empty());
}
