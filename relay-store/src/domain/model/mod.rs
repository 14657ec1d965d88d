use relay_core::model::Message;

/// Observable result of applying one status event to the log.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// No record existed for the correlation key; a new one was created.
    Inserted(Message),
    /// The existing record advanced to the event's status.
    Applied(Message),
    /// Discarded: the record already reached a terminal status.
    DiscardedTerminal,
    /// Discarded: the event is older than the last applied one.
    DiscardedSuperseded,
}

impl IngestOutcome {
    /// The merged record, when the event changed the log.
    pub fn merged(&self) -> Option<&Message> {
        match self {
            IngestOutcome::Inserted(message) | IngestOutcome::Applied(message) => Some(message),
            _ => None,
        }
    }

    /// Metric label for the outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestOutcome::Inserted(_) => "inserted",
            IngestOutcome::Applied(_) => "applied",
            IngestOutcome::DiscardedTerminal => "discarded_terminal",
            IngestOutcome::DiscardedSuperseded => "discarded_superseded",
        }
    }
}
