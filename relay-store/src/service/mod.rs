mod bootstrap;
mod wire;

pub use bootstrap::ApplicationBootstrap;
pub use wire::{StoreContext, in_process_consumer, initialize};
