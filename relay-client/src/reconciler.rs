//! Pure view reconciliation.
//!
//! Both notification paths (poll and push) end up here, so the merge rules
//! are plain functions with no network or timer dependency.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use relay_core::model::{DeliveryStatus, Message};

/// Merge the authoritative list with the locally held optimistic set into
/// one consistent, chronologically ordered view.
///
/// Persisted entries always win per correlation key. An optimistic entry is
/// dropped when its key is already persisted, or when it is still `PENDING`
/// past `stale_after` (presumed persisted but not yet visible to this read;
/// shown stale it would linger as a phantom).
pub fn reconcile(
    persisted: &[Message],
    optimistic: &[Message],
    stale_after: Duration,
    now: DateTime<Utc>,
) -> Vec<Message> {
    let stale_threshold = chrono::Duration::milliseconds(stale_after.as_millis() as i64);

    let mut seen: HashSet<&str> = persisted.iter().map(|m| m.correlation_key()).collect();
    let mut merged: Vec<Message> = persisted.to_vec();

    for candidate in optimistic {
        if !seen.insert(candidate.correlation_key()) {
            continue;
        }
        if candidate.status == DeliveryStatus::Pending
            && now.signed_duration_since(candidate.created_at) > stale_threshold
        {
            continue;
        }
        merged.push(candidate.clone());
    }

    merged.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

/// Apply a pushed status to the first entry matching the correlation key,
/// under the same monotonic rule as the store: a terminal status never
/// regresses. Returns whether any entry matched.
pub fn apply_status(
    messages: &mut [Message],
    correlation_id: &str,
    status: DeliveryStatus,
) -> bool {
    for message in messages.iter_mut() {
        if message.correlation_key() != correlation_id {
            continue;
        }
        if !(message.status.is_terminal() && message.status != status) {
            message.status = status;
        }
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(key: &str, status: DeliveryStatus, created_ms: i64) -> Message {
        Message {
            id: format!("id-{key}"),
            correlation_id: Some(key.to_string()),
            recipient: "+15551234567".to_string(),
            text: "hi".to_string(),
            status,
            created_at: Utc.timestamp_millis_opt(created_ms).single().unwrap(),
            last_event_ts: created_ms,
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap()
    }

    const STALE: Duration = Duration::from_millis(2500);

    #[test]
    fn persisted_wins_over_optimistic_for_the_same_key() {
        let persisted = vec![message("r1", DeliveryStatus::Success, 1_000)];
        let optimistic = vec![message("r1", DeliveryStatus::Pending, 1_000)];

        let view = reconcile(&persisted, &optimistic, STALE, at(1_500));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].status, DeliveryStatus::Success);
    }

    #[test]
    fn one_entry_per_key_across_both_sets() {
        let persisted = vec![
            message("r1", DeliveryStatus::Success, 1_000),
            message("r2", DeliveryStatus::Received, 2_000),
        ];
        let optimistic = vec![
            message("r2", DeliveryStatus::Pending, 2_000),
            message("r3", DeliveryStatus::Pending, 3_000),
            message("r3", DeliveryStatus::Pending, 3_100),
        ];

        let view = reconcile(&persisted, &optimistic, STALE, at(3_200));
        let keys: Vec<&str> = view.iter().map(|m| m.correlation_key()).collect();
        assert_eq!(keys, vec!["r1", "r2", "r3"]);
        // every persisted key shows the persisted status
        assert_eq!(view[0].status, DeliveryStatus::Success);
        assert_eq!(view[1].status, DeliveryStatus::Received);
    }

    #[test]
    fn stale_pending_entries_are_evicted() {
        let optimistic = vec![message("r1", DeliveryStatus::Pending, 1_000)];

        let fresh = reconcile(&[], &optimistic, STALE, at(2_000));
        assert_eq!(fresh.len(), 1);

        let stale = reconcile(&[], &optimistic, STALE, at(4_000));
        assert!(stale.is_empty());
    }

    #[test]
    fn confirmed_optimistic_entries_survive_the_freshness_threshold() {
        // a push already advanced this entry; it is no phantom
        let optimistic = vec![message("r1", DeliveryStatus::Success, 1_000)];
        let view = reconcile(&[], &optimistic, STALE, at(10_000));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn output_is_ordered_by_creation_time() {
        let persisted = vec![
            message("r2", DeliveryStatus::Received, 2_000),
            message("r1", DeliveryStatus::Received, 1_000),
        ];
        let optimistic = vec![message("r3", DeliveryStatus::Pending, 1_500)];

        let view = reconcile(&persisted, &optimistic, STALE, at(2_000));
        let keys: Vec<&str> = view.iter().map(|m| m.correlation_key()).collect();
        assert_eq!(keys, vec!["r1", "r3", "r2"]);
    }

    #[test]
    fn empty_inputs_reconcile_to_empty() {
        assert!(reconcile(&[], &[], STALE, at(0)).is_empty());
    }

    #[test]
    fn apply_status_matches_by_key_and_keeps_terminal_sticky() {
        let mut messages = vec![
            message("r1", DeliveryStatus::Pending, 1_000),
            message("r2", DeliveryStatus::Success, 2_000),
        ];

        assert!(apply_status(&mut messages, "r1", DeliveryStatus::Success));
        assert_eq!(messages[0].status, DeliveryStatus::Success);

        // terminal never regresses
        assert!(apply_status(&mut messages, "r2", DeliveryStatus::Received));
        assert_eq!(messages[1].status, DeliveryStatus::Success);

        assert!(!apply_status(&mut messages, "r9", DeliveryStatus::Failed));
    }
}
