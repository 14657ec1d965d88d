/// Remove every message of one recipient.
#[derive(Debug, Clone)]
pub struct PurgeRecipientCommand {
    pub recipient: String,
}

/// Administrative: empty the whole log.
#[derive(Debug, Clone)]
pub struct PurgeAllCommand;
