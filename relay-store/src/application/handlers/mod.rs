mod command_handler;
mod query_handler;

pub use command_handler::StoreCommandHandler;
pub use query_handler::StoreQueryHandler;
