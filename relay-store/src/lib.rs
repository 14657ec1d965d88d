//! Relay Store
//!
//! Server side of the delivery pipeline: the durable per-recipient message
//! log with idempotent, order-tolerant merge semantics, the delivery-status
//! event ingestor, and the read API projection over the log.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod metrics;
pub mod service;
