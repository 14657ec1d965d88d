//! Relay Client
//!
//! Client side of the delivery pipeline: the optimistic send view, the
//! reconciliation of the authoritative log against it, the bounded delivery
//! poller, and the push-channel subscription. All state is keyed by
//! recipient; both notification paths feed one reconciliation entry point.

pub mod client;
pub mod config;
pub mod fetcher;
pub mod poller;
pub mod push;
pub mod reconciler;
pub mod sender;
pub mod session;

pub use client::MessagingClient;
pub use config::ClientConfig;
pub use fetcher::{HttpStatusFetcher, MessageFetcher};
pub use poller::DeliveryPoller;
pub use push::{BroadcastPushChannel, NoopPushChannel, PushSubscription, StatusPushChannel};
pub use sender::{HttpSmsSender, SendError, SmsSender};
pub use session::SessionRegistry;
