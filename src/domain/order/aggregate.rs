use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::events::{OrderDeliveryUpdated, Restock};
use super::value_objects::{DeliveryDetails, OrderItem, OrderLine, OrderStatus, Rating, TelemetryPatch};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    /// Optimistic concurrency token, bumped by every stored change
    pub version: i64,

    #[serde(rename = "clienteId")]
    pub customer_id: Uuid,
    #[serde(rename = "perfilComercialId")]
    pub profile_id: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    #[serde(rename = "estado")]
    pub status: OrderStatus,

    #[serde(flatten)]
    pub delivery: DeliveryDetails,

    // Audit trail
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: Option<DateTime<Utc>>,

    // Courier telemetry
    #[serde(rename = "latitudRepartidor")]
    pub courier_latitude: Option<f64>,
    #[serde(rename = "longitudRepartidor")]
    pub courier_longitude: Option<f64>,
    #[serde(rename = "progresoRuta")]
    pub route_progress: Option<f64>,
    #[serde(rename = "rutaGeometry")]
    pub route_geometry: Option<String>,
    #[serde(rename = "duracionRutaSegundos")]
    pub route_duration_secs: Option<i64>,
    #[serde(rename = "fechaInicioRuta")]
    pub route_started_at: Option<DateTime<Utc>>,

    #[serde(rename = "puntuacion")]
    pub rating: Option<Rating>,

    /// Cancelled items whose stock has not made it back to the catalog yet
    #[serde(rename = "reposicionPendiente", default, skip_serializing_if = "Vec::is_empty")]
    pub pending_restock: Vec<Restock>,
}

/// Outcome of checking a requested status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target equals the current status
    Unchanged,
    Advance { from: OrderStatus, to: OrderStatus },
    Cancel { from: OrderStatus },
}

impl Order {
    /// Build a freshly placed order. Totals are derived from the items.
    pub fn place(
        id: Uuid,
        customer_id: Uuid,
        profile_id: Uuid,
        items: Vec<OrderItem>,
        delivery: DeliveryDetails,
        now: DateTime<Utc>,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(|item| item.subtotal).sum();

        Self {
            id,
            version: 1,
            customer_id,
            profile_id,
            items,
            subtotal,
            // No taxes or discounts yet
            total: subtotal,
            status: OrderStatus::Pending,
            delivery,
            created_at: now,
            updated_at: None,
            courier_latitude: None,
            courier_longitude: None,
            route_progress: None,
            route_geometry: None,
            route_duration_secs: None,
            route_started_at: None,
            rating: None,
            pending_restock: Vec::new(),
        }
    }

    pub fn belongs_to_customer(&self, customer_id: Uuid) -> bool {
        self.customer_id == customer_id
    }

    /// Join records for the order's items, in item order
    pub fn lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                id: Uuid::now_v7(),
                order_id: self.id,
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal,
                created_at: self.created_at,
            })
            .collect()
    }

    /// Quantities to hand back to the catalog when this order is cancelled
    pub fn restock(&self) -> Vec<Restock> {
        self.items
            .iter()
            .map(|item| Restock {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }

    /// Decide whether the order may move to `target`.
    ///
    /// Delivered and cancelled orders are terminal. Cancellation is allowed
    /// from every other status; otherwise the order may only move forward,
    /// possibly skipping steps.
    pub fn plan_transition(&self, target: OrderStatus) -> Result<Transition, OrderError> {
        let from = self.status;

        if target == from {
            return Ok(Transition::Unchanged);
        }

        let invalid = || OrderError::InvalidTransition { from, to: target };

        if from.is_terminal() {
            return Err(invalid());
        }

        if target == OrderStatus::Cancelled {
            return Ok(Transition::Cancel { from });
        }

        match (from.forward_rank(), target.forward_rank()) {
            (Some(current), Some(next)) if next > current => Ok(Transition::Advance { from, to: target }),
            _ => Err(invalid()),
        }
    }

    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }

    /// Apply a partial telemetry update. Fields absent from the patch keep
    /// their previous values.
    pub fn apply_telemetry(
        &mut self,
        patch: &TelemetryPatch,
        now: DateTime<Utc>,
    ) -> Result<OrderDeliveryUpdated, OrderError> {
        patch.validate()?;

        let mut change = OrderDeliveryUpdated {
            latitude: patch.latitude,
            longitude: patch.longitude,
            route_progress: patch.route_progress,
            route_duration_secs: patch.route_duration_secs,
            ..Default::default()
        };

        if let Some(lat) = patch.latitude {
            self.courier_latitude = Some(lat);
        }
        if let Some(lng) = patch.longitude {
            self.courier_longitude = Some(lng);
        }
        if let Some(progress) = patch.route_progress {
            self.route_progress = Some(progress);
        }
        if let Some(geometry) = patch.geometry() {
            self.route_geometry = Some(geometry.to_string());
            change.route_geometry_set = true;

            // The route clock starts with the first geometry only
            if self.route_started_at.is_none() {
                self.route_started_at = Some(now);
                change.route_started = true;
            }
        }
        if let Some(duration) = patch.route_duration_secs {
            self.route_duration_secs = Some(duration);
        }

        self.updated_at = Some(now);
        Ok(change)
    }

    pub fn apply_rating(&mut self, rating: Rating, now: DateTime<Utc>) {
        self.rating = Some(rating);
        self.updated_at = Some(now);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap()
    }

    fn product(price: Decimal) -> Product {
        Product {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            name: "Majadito".to_string(),
            price,
            stock: 50,
            available: true,
        }
    }

    fn order_with_status(status: OrderStatus) -> Order {
        let items = vec![OrderItem::from_catalog(&product(dec!(10)), 1)];
        let mut order = Order::place(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            items,
            DeliveryDetails::default(),
            now(),
        );
        order.status = status;
        order
    }

    #[test]
    fn test_place_computes_totals() {
        let items = vec![
            OrderItem::from_catalog(&product(dec!(8.50)), 3),
            OrderItem::from_catalog(&product(dec!(12.25)), 2),
        ];

        let order = Order::place(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            items,
            DeliveryDetails::default(),
            now(),
        );

        assert_eq!(order.subtotal, dec!(50.00));
        assert_eq!(order.total, order.subtotal);
        assert_eq!(order.total, order.items.iter().map(|i| i.subtotal).sum::<Decimal>());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, 1);
        assert_eq!(order.created_at, now());
        assert_eq!(order.updated_at, None);
    }

    #[test]
    fn test_lines_follow_item_order() {
        let order = Order::place(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            vec![
                OrderItem::from_catalog(&product(dec!(1)), 1),
                OrderItem::from_catalog(&product(dec!(2)), 4),
            ],
            DeliveryDetails::default(),
            now(),
        );

        let lines = order.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, order.items[0].product_id);
        assert_eq!(lines[1].quantity, 4);
        assert_eq!(lines[1].subtotal, dec!(8));
        assert!(lines.iter().all(|l| l.order_id == order.id));
    }

    #[test]
    fn test_forward_transitions() {
        let order = order_with_status(OrderStatus::Pending);
        assert_eq!(
            order.plan_transition(OrderStatus::Confirmed).unwrap(),
            Transition::Advance { from: OrderStatus::Pending, to: OrderStatus::Confirmed }
        );
        // Skipping steps is allowed
        assert!(matches!(
            order.plan_transition(OrderStatus::Delivered),
            Ok(Transition::Advance { .. })
        ));
    }

    #[test]
    fn test_backward_transition_rejected() {
        let order = order_with_status(OrderStatus::InTransit);
        let result = order.plan_transition(OrderStatus::Confirmed);
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn test_cancel_allowed_from_every_open_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::InPreparation,
            OrderStatus::InTransit,
        ] {
            let order = order_with_status(status);
            assert_eq!(
                order.plan_transition(OrderStatus::Cancelled).unwrap(),
                Transition::Cancel { from: status }
            );
        }
    }

    #[test]
    fn test_delivered_is_terminal() {
        let order = order_with_status(OrderStatus::Delivered);
        let result = order.plan_transition(OrderStatus::Cancelled);
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled
            })
        ));
        assert!(order.plan_transition(OrderStatus::Pending).is_err());
    }

    #[test]
    fn test_cancelled_is_terminal_but_idempotent() {
        let order = order_with_status(OrderStatus::Cancelled);
        assert_eq!(order.plan_transition(OrderStatus::Cancelled).unwrap(), Transition::Unchanged);
        assert!(order.plan_transition(OrderStatus::Pending).is_err());
        assert!(order.plan_transition(OrderStatus::Delivered).is_err());
    }

    #[test]
    fn test_partial_telemetry_update_keeps_other_fields() {
        let mut order = order_with_status(OrderStatus::InTransit);
        order.courier_longitude = Some(-63.18);
        order.route_progress = Some(0.1);
        order.route_geometry = Some("encoded".to_string());
        order.route_duration_secs = Some(600);

        let patch = TelemetryPatch { latitude: Some(-17.78), ..Default::default() };
        let change = order.apply_telemetry(&patch, now()).unwrap();

        assert_eq!(order.courier_latitude, Some(-17.78));
        assert_eq!(order.courier_longitude, Some(-63.18));
        assert_eq!(order.route_progress, Some(0.1));
        assert_eq!(order.route_geometry.as_deref(), Some("encoded"));
        assert_eq!(order.route_duration_secs, Some(600));
        assert_eq!(order.updated_at, Some(now()));
        assert!(!change.route_geometry_set);
    }

    #[test]
    fn test_progress_only_does_not_start_route() {
        let mut order = order_with_status(OrderStatus::InTransit);

        let patch = TelemetryPatch { route_progress: Some(0.42), ..Default::default() };
        order.apply_telemetry(&patch, now()).unwrap();

        assert_eq!(order.route_progress, Some(0.42));
        assert_eq!(order.route_started_at, None);
        assert_eq!(order.route_geometry, None);
        assert_eq!(order.courier_latitude, None);
        assert_eq!(order.courier_longitude, None);
        assert_eq!(order.route_duration_secs, None);
    }

    #[test]
    fn test_first_geometry_stamps_route_start_once() {
        let mut order = order_with_status(OrderStatus::InTransit);
        let first = TelemetryPatch { route_geometry: Some("abc".to_string()), ..Default::default() };

        let change = order.apply_telemetry(&first, now()).unwrap();
        assert!(change.route_started);
        assert_eq!(order.route_started_at, Some(now()));

        let second = TelemetryPatch { route_geometry: Some("abcd".to_string()), ..Default::default() };
        let later = now() + Duration::minutes(5);
        let change = order.apply_telemetry(&second, later).unwrap();

        assert!(!change.route_started);
        assert_eq!(order.route_started_at, Some(now()));
        assert_eq!(order.route_geometry.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_invalid_telemetry_leaves_order_untouched() {
        let mut order = order_with_status(OrderStatus::InTransit);
        let before = order.clone();

        let patch = TelemetryPatch {
            latitude: Some(10.0),
            route_progress: Some(1.5),
            ..Default::default()
        };

        assert!(order.apply_telemetry(&patch, now()).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn test_order_wire_names() {
        let mut order = order_with_status(OrderStatus::Pending);
        order.delivery.address = Some("Av. Monseñor Rivero 123".to_string());
        order.apply_rating(Rating::new(4).unwrap(), now());

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["estado"], "Pendiente");
        assert_eq!(json["direccionEntrega"], "Av. Monseñor Rivero 123");
        assert_eq!(json["puntuacion"], 4);
        assert!(json.get("clienteId").is_some());
        assert!(json.get("perfilComercialId").is_some());
        assert!(json["items"][0].get("precioUnitario").is_some());
        assert!(json.get("fechaCreacion").is_some());
        assert!(json.get("reposicionPendiente").is_none());
    }
}
