//! Dependency wiring.
//!
//! Builds the store's object graph in dependency order: repositories →
//! domain services → handlers → interface.

use std::sync::Arc;

use relay_core::config::RelayAppConfig;

use crate::application::handlers::{StoreCommandHandler, StoreQueryHandler};
use crate::config::StoreConfig;
use crate::domain::repository::{MessageRepository, ProfileRepository, StatusNotifier};
use crate::domain::service::{MessageLogDomainService, ProfileDomainService};
use crate::infrastructure::messaging::{
    BroadcastStatusNotifier, EventPublisher, InProcessEventBus, InProcessEventSource,
};
use crate::infrastructure::persistence::{InMemoryMessageStore, InMemoryProfileStore};
use crate::interface::api::StatusReadApi;
use crate::interface::messaging::DeliveryEventConsumer;
use crate::metrics::StoreMetrics;

/// All initialized store services.
pub struct StoreContext {
    pub api: Arc<StatusReadApi>,
    pub command_handler: Arc<StoreCommandHandler>,
    pub query_handler: Arc<StoreQueryHandler>,
    pub notifier: Arc<BroadcastStatusNotifier>,
    pub metrics: Arc<StoreMetrics>,
    pub config: StoreConfig,
}

pub fn initialize(app_config: &RelayAppConfig) -> StoreContext {
    let config = StoreConfig::from_app_config(app_config);
    let metrics = Arc::new(StoreMetrics::new());

    let message_repo: Arc<dyn MessageRepository> = Arc::new(InMemoryMessageStore::new());
    let profile_repo: Arc<dyn ProfileRepository> = Arc::new(InMemoryProfileStore::new());
    let notifier = Arc::new(BroadcastStatusNotifier::new(256));

    let log_service = Arc::new(MessageLogDomainService::new(
        message_repo,
        Some(notifier.clone() as Arc<dyn StatusNotifier>),
    ));
    let profile_service = Arc::new(ProfileDomainService::new(profile_repo));

    let command_handler = Arc::new(StoreCommandHandler::new(
        log_service.clone(),
        profile_service.clone(),
        metrics.clone(),
    ));
    let query_handler = Arc::new(StoreQueryHandler::new(log_service, profile_service));
    let api = Arc::new(StatusReadApi::new(
        command_handler.clone(),
        query_handler.clone(),
    ));

    StoreContext {
        api,
        command_handler,
        query_handler,
        notifier,
        metrics,
        config,
    }
}

/// Consumer over the in-process bus, plus the publisher feeding it.
pub fn in_process_consumer(
    context: &StoreContext,
) -> (EventPublisher, DeliveryEventConsumer<InProcessEventSource>) {
    let (publisher, source) = InProcessEventBus::channel();
    let consumer = DeliveryEventConsumer::new(
        source,
        context.command_handler.clone(),
        context.metrics.clone(),
        context.config.redelivery_backoff_ms,
    );
    (publisher, consumer)
}
