use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::OrderError;
use crate::domain::catalog::Product;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Order lifecycle status.
///
/// Forward path: Pendiente -> Confirmado -> EnPreparacion -> EnCamino -> Entregado.
/// Cancelado is reachable from every non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "Pendiente")]
    Pending,
    #[serde(rename = "Confirmado")]
    Confirmed,
    #[serde(rename = "EnPreparacion")]
    InPreparation,
    #[serde(rename = "EnCamino")]
    InTransit,
    #[serde(rename = "Entregado")]
    Delivered,
    #[serde(rename = "Cancelado")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InPreparation,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::InPreparation => "EnPreparacion",
            OrderStatus::InTransit => "EnCamino",
            OrderStatus::Delivered => "Entregado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position on the forward path; `None` for Cancelado
    pub fn forward_rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::InPreparation => Some(2),
            OrderStatus::InTransit => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::InvalidStatus(s.to_string()))
    }
}

/// One product line of an order, with price and name frozen at creation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    #[serde(rename = "productoId")]
    pub product_id: Uuid,
    #[serde(rename = "nombreProducto")]
    pub product_name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl OrderItem {
    /// Snapshot the catalog entry's current name and price
    pub fn from_catalog(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity,
            unit_price: product.price,
            subtotal: product.price * Decimal::from(quantity),
        }
    }
}

/// Order/product join record, one per item
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    #[serde(rename = "pedidoId")]
    pub order_id: Uuid,
    #[serde(rename = "productoId")]
    pub product_id: Uuid,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
}

/// Where the customer wants the order delivered
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DeliveryDetails {
    #[serde(rename = "direccionEntrega", default)]
    pub address: Option<String>,
    #[serde(rename = "latitudEntrega", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "longitudEntrega", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "notas", default)]
    pub notes: Option<String>,
}

/// Partial update of the courier telemetry. Absent fields are left alone.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TelemetryPatch {
    #[serde(rename = "latitud", default)]
    pub latitude: Option<f64>,
    #[serde(rename = "longitud", default)]
    pub longitude: Option<f64>,
    #[serde(rename = "progresoRuta", default)]
    pub route_progress: Option<f64>,
    #[serde(rename = "rutaGeometry", default)]
    pub route_geometry: Option<String>,
    #[serde(rename = "duracionRutaSegundos", default)]
    pub route_duration_secs: Option<i64>,
}

impl TelemetryPatch {
    /// Empty geometry strings count as absent
    pub fn geometry(&self) -> Option<&str> {
        self.route_geometry.as_deref().filter(|g| !g.is_empty())
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if let Some(lat) = self.latitude {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(OrderError::InvalidTelemetry(format!("latitude {lat} out of range")));
            }
        }
        if let Some(lng) = self.longitude {
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err(OrderError::InvalidTelemetry(format!("longitude {lng} out of range")));
            }
        }
        if let Some(progress) = self.route_progress {
            if !progress.is_finite() || !(0.0..=1.0).contains(&progress) {
                return Err(OrderError::InvalidTelemetry(format!(
                    "route progress {progress} must be between 0 and 1"
                )));
            }
        }
        if let Some(duration) = self.route_duration_secs {
            if duration < 0 {
                return Err(OrderError::InvalidTelemetry(format!(
                    "route duration {duration} cannot be negative"
                )));
            }
        }
        Ok(())
    }
}

/// Delivery rating given by the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Result<Self, OrderError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(OrderError::InvalidRating(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
