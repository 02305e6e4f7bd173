// ============================================================================
// Store - In-memory adapters for the domain ports
// ============================================================================

mod catalog;
mod fixtures;
mod orders;
mod profiles;

pub use catalog::InMemoryCatalog;
pub use fixtures::Fixtures;
pub use orders::InMemoryOrderStore;
pub use profiles::InMemoryProfileDirectory;
