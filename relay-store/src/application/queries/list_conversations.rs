/// Distinct recipients with at least one message.
#[derive(Debug, Clone)]
pub struct ListConversationsQuery;
