use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

// ============================================================================
// Event Envelope - Journal entry metadata
// ============================================================================
//
// Wraps a domain event with the metadata needed to audit an aggregate's
// history. Generic over the event payload.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<E> {
    // Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    // Type information
    pub event_type: String,

    // Payload
    pub event_data: E,

    // Who triggered this event
    pub user_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(aggregate_id: Uuid, event_data: E, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id,
            // Assigned by the store when the entry is appended
            sequence_number: 0,
            event_type: event_data.event_type().to_string(),
            event_data,
            user_id: None,
            timestamp,
            metadata: HashMap::new(),
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn with_user(mut self, user_id: Option<Uuid>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

/// Anything that can be recorded in an aggregate journal
pub trait DomainEvent: Serialize + Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct TestEvent {
        data: String,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str { "TestEvent" }
    }

    #[test]
    fn test_event_envelope_creation() {
        let aggregate_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();

        let envelope = EventEnvelope::new(aggregate_id, TestEvent { data: "test".to_string() }, at)
            .with_user(Some(user_id))
            .with_metadata("source", "api");

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.sequence_number, 0);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.user_id, Some(user_id));
        assert_eq!(envelope.timestamp, at);
        assert_eq!(envelope.metadata.get("source").map(String::as_str), Some("api"));
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = EventEnvelope::new(
            Uuid::new_v4(),
            TestEvent { data: "payload".to_string() },
            Utc::now(),
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["eventType"], "TestEvent");
        assert_eq!(json["eventData"]["data"], "payload");
        assert!(json.get("metadata").is_none());
    }
}
