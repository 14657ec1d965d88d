use relay_core::model::StatusEvent;

/// Apply one delivery-status event to the log.
#[derive(Debug, Clone)]
pub struct IngestStatusEventCommand {
    pub event: StatusEvent,
}
