// ============================================================================
// Journal - Generic change history infrastructure
// ============================================================================
//
// Every committed change to an aggregate is recorded as an envelope in the
// same store write as the change itself. Domain-specific events live in
// src/domain/.
//
// ============================================================================

mod envelope;

pub use envelope::{DomainEvent, EventEnvelope};
