mod ingest_status_event;
mod profiles;
mod purge_messages;
mod record_message;

pub use ingest_status_event::IngestStatusEventCommand;
pub use profiles::{CreateProfileCommand, UpdateProfileCommand};
pub use purge_messages::{PurgeAllCommand, PurgeRecipientCommand};
pub use record_message::RecordMessageCommand;
