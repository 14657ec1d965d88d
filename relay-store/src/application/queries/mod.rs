mod get_profile;
mod list_conversations;
mod list_messages;

pub use get_profile::GetProfileQuery;
pub use list_conversations::ListConversationsQuery;
pub use list_messages::ListMessagesQuery;
