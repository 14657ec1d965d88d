/// Create a message record directly, bypassing the event stream.
#[derive(Debug, Clone)]
pub struct RecordMessageCommand {
    pub recipient: String,
    pub text: String,
}
