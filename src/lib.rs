// ============================================================================
// Marketplace Orders - Order lifecycle and inventory engine
// ============================================================================
//
// Layers:
// - domain   order aggregate, engine and the ports it depends on
// - store    in-memory adapters for those ports
// - journal  per-order change history envelopes
// - api      actix-web routes under /api/pedidos
// - metrics  Prometheus registry plus /metrics and /health
//
// ============================================================================

pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod journal;
pub mod metrics;
pub mod state;
pub mod store;

pub use state::{AppState, InMemoryBackend};
