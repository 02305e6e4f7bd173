// ============================================================================
// Order Domain - Order lifecycle and stock consistency
// ============================================================================
//
// This module contains ALL order-specific code:
// - Value objects (OrderStatus, OrderItem, OrderLine, TelemetryPatch, Rating)
// - Commands (PlaceOrder, ChangeStatus, UpdateDelivery, RateDelivery)
// - Errors (OrderError and its ErrorKind)
// - Events (journal entries for every committed change)
// - Aggregate (Order with the status state machine)
// - Repository port (OrderRepository)
// - Command Handler (OrderCommandHandler, the order engine)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod repository;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use repository::*;
pub use command_handler::*;
