mod consumer;

pub use consumer::DeliveryEventConsumer;
