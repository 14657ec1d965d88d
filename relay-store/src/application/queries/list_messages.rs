/// Messages of one recipient, ascending by creation time.
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub recipient: String,
}
