use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::domain::storage::StoreError;

// ============================================================================
// Order Errors
// ============================================================================

/// How a failure should be surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    BusinessRule,
    Unauthorized,
    Conflict,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Commercial profile {0} not found or inactive")]
    ProfileUnavailable(Uuid),

    #[error("Product {name} is unavailable or does not have enough stock")]
    ProductUnavailable { product_id: Uuid, name: String },

    #[error("Product {name} does not belong to commercial profile {profile_id}")]
    WrongProfile {
        product_id: Uuid,
        name: String,
        profile_id: Uuid,
    },

    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i64),

    #[error("A customer id is required to place an order")]
    MissingCustomer,

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    #[error("Invalid delivery telemetry: {0}")]
    InvalidTelemetry(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Order {0} was modified concurrently, retry with fresh data")]
    Conflict(Uuid),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::NotFound(_) => ErrorKind::NotFound,
            OrderError::EmptyItems
            | OrderError::InvalidQuantity(_)
            | OrderError::MissingCustomer
            | OrderError::InvalidStatus(_)
            | OrderError::InvalidRating(_)
            | OrderError::InvalidTelemetry(_) => ErrorKind::Validation,
            OrderError::ProfileUnavailable(_)
            | OrderError::ProductUnavailable { .. }
            | OrderError::WrongProfile { .. }
            | OrderError::InvalidTransition { .. } => ErrorKind::BusinessRule,
            OrderError::Unauthorized(_) => ErrorKind::Unauthorized,
            OrderError::Conflict(_) => ErrorKind::Conflict,
            OrderError::Storage(e) if e.is_conflict() => ErrorKind::Conflict,
            OrderError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            OrderError::NotFound(_) => "not_found",
            OrderError::ProfileUnavailable(_) => "profile_unavailable",
            OrderError::ProductUnavailable { .. } => "product_unavailable",
            OrderError::WrongProfile { .. } => "wrong_profile",
            OrderError::EmptyItems => "empty_items",
            OrderError::InvalidQuantity(_) => "invalid_quantity",
            OrderError::MissingCustomer => "missing_customer",
            OrderError::InvalidStatus(_) => "invalid_status",
            OrderError::InvalidTransition { .. } => "invalid_transition",
            OrderError::InvalidRating(_) => "invalid_rating",
            OrderError::InvalidTelemetry(_) => "invalid_telemetry",
            OrderError::Unauthorized(_) => "unauthorized",
            OrderError::Conflict(_) => "conflict",
            OrderError::Storage(_) => "storage",
        }
    }
}
