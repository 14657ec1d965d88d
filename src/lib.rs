//! Relay Core
//!
//! Shared kernel for the relay workspace: the message/status domain model,
//! the error taxonomy, application configuration and small utilities used by
//! both the store server (`relay-store`) and the sync client (`relay-client`).

pub mod config;
pub mod error;
pub mod model;
pub mod utils;

pub use config::RelayAppConfig;
pub use error::{RelayError, Result};
