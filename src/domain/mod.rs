// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order/    the order engine and everything it owns
// - catalog/  products, read and stock-adjusted by the engine
// - profile/  commercial profiles, read by the engine
// - caller    identity handed over by the authorization gate
// - storage   errors reported by persistence adapters
//
// ============================================================================

pub mod caller;
pub mod catalog;
pub mod order;
pub mod profile;
pub mod storage;

pub use caller::{Caller, Role};
pub use storage::StoreError;
