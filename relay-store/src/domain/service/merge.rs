//! Status-merge policy.
//!
//! The policy is a pure function over the existing record and the incoming
//! event so the ordering/terminality matrix can be tested without a store.
//! Store implementations run it under their per-key serialization point.

use chrono::Utc;

use relay_core::model::{Message, StatusEvent};
use relay_core::utils::{millis_to_datetime, new_message_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// No record exists for the correlation key; insert one from the event.
    Insert,
    /// Advance the existing record to the event's status.
    Apply,
    Discard(DiscardReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The record already reached a terminal status and the event differs.
    TerminalReached,
    /// The event is older than the last applied one.
    Superseded,
}

pub fn merge(existing: Option<&Message>, incoming: &StatusEvent) -> MergeDecision {
    match existing {
        None => MergeDecision::Insert,
        Some(existing) => match resolve(existing, incoming) {
            Resolution::Apply => MergeDecision::Apply,
            Resolution::Discard(reason) => MergeDecision::Discard(reason),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Apply,
    Discard(DiscardReason),
}

/// Decide between an existing record and an incoming event.
///
/// Terminal status is sticky: once reached, a differing event is discarded.
/// Older events are discarded as superseded, except that a terminal event
/// always wins over a non-terminal record regardless of timestamp.
pub fn resolve(existing: &Message, incoming: &StatusEvent) -> Resolution {
    if existing.status.is_terminal() && incoming.status != existing.status {
        return Resolution::Discard(DiscardReason::TerminalReached);
    }
    if incoming.event_time < existing.last_event_ts {
        if incoming.status.is_terminal() && !existing.status.is_terminal() {
            return Resolution::Apply;
        }
        return Resolution::Discard(DiscardReason::Superseded);
    }
    Resolution::Apply
}

/// Build the record inserted when an event arrives before any record for its
/// correlation key exists: the event's status, its event time as the
/// creation time.
pub fn message_from_event(event: &StatusEvent) -> Message {
    Message {
        id: new_message_id(),
        correlation_id: Some(event.correlation_id.clone()),
        recipient: event.recipient.clone().unwrap_or_default(),
        text: event.text.clone().unwrap_or_default(),
        status: event.status,
        created_at: millis_to_datetime(event.event_time).unwrap_or_else(Utc::now),
        last_event_ts: event.event_time,
    }
}

/// Apply an accepted event to the record in place.
pub fn apply_to(record: &mut Message, event: &StatusEvent) {
    record.status = event.status;
    record.last_event_ts = event.event_time;
}
