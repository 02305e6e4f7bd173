use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::catalog::ProductCatalog;
use crate::domain::profile::ProfileDirectory;
use crate::domain::storage::StoreError;
use crate::journal::EventEnvelope;
use crate::metrics::Metrics;

use super::aggregate::{Order, Transition};
use super::commands::{ChangeStatus, PlaceOrder, RateDelivery, RequestedItem, UpdateDelivery};
use super::errors::OrderError;
use super::events::{
    OrderCancelled, OrderCreated, OrderEvent, OrderRated, OrderRestockPending, OrderRestockRetried,
    OrderStatusChanged, Restock,
};
use super::repository::OrderRepository;
use super::value_objects::{OrderItem, OrderLine, OrderStatus, Rating};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Catalog/Profile checks → Aggregate → Order store
//
// Order placement is a saga: stock is reserved item by item with atomic
// conditional decrements and every reservation is handed back if a later
// step fails, so a failed placement leaves the catalog as it found it.
//
// ============================================================================

pub struct OrderCommandHandler {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn ProductCatalog>,
    profiles: Arc<dyn ProfileDirectory>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn ProductCatalog>,
        profiles: Arc<dyn ProfileDirectory>,
        clock: Arc<dyn Clock>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            orders,
            catalog,
            profiles,
            clock,
            metrics,
        }
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Validate, price and place an order, reserving its stock
    pub async fn place_order(&self, command: PlaceOrder) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.try_place_order(command).await;
        self.observe("place_order", started, &result);

        if let Ok(order) = &result {
            self.metrics.record_order_created();
            tracing::info!(
                order_id = %order.id,
                customer_id = %order.customer_id,
                profile_id = %order.profile_id,
                item_count = order.items.len(),
                total = %order.total,
                "Order placed"
            );
        }

        result
    }

    /// Move an order to another status, restoring stock on cancellation
    pub async fn change_status(&self, command: ChangeStatus) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.try_change_status(command).await;
        self.observe("change_status", started, &result);
        result
    }

    /// Apply a partial courier telemetry update
    pub async fn update_delivery(&self, command: UpdateDelivery) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.try_update_delivery(command).await;
        self.observe("update_delivery", started, &result);
        result
    }

    /// Store the customer's delivery rating
    pub async fn rate_delivery(&self, command: RateDelivery) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.try_rate_delivery(command).await;
        self.observe("rate_delivery", started, &result);
        result
    }

    /// Remove an order together with its lines and journal. Stock is not
    /// touched; cancel first if the items should go back on sale.
    pub async fn delete_order(&self, order_id: Uuid, requested_by: Option<Uuid>) -> Result<(), OrderError> {
        let started = Instant::now();
        let result = match self.orders.delete(order_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(OrderError::NotFound(order_id)),
            Err(e) => Err(e.into()),
        };
        self.observe("delete_order", started, &result);

        if result.is_ok() {
            tracing::info!(order_id = %order_id, requested_by = ?requested_by, "Order deleted");
        }

        result
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub async fn get_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.orders
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    pub async fn orders_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_customer(customer_id).await?)
    }

    pub async fn orders_for_profile(&self, profile_id: Uuid) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_profile(profile_id).await?)
    }

    /// Orders across every profile of a company, newest first
    pub async fn orders_for_company(&self, company_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let mut orders = Vec::new();
        for profile in self.profiles.list_by_company(company_id).await? {
            orders.extend(self.orders.list_by_profile(profile.id).await?);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_all().await?)
    }

    pub async fn order_lines(&self, order_id: Uuid) -> Result<Vec<OrderLine>, OrderError> {
        self.get_order(order_id).await?;
        Ok(self.orders.lines_for_order(order_id).await?)
    }

    pub async fn order_history(&self, order_id: Uuid) -> Result<Vec<EventEnvelope<OrderEvent>>, OrderError> {
        self.get_order(order_id).await?;
        Ok(self.orders.history(order_id).await?)
    }

    /// Whether `profile_id` exists and belongs to `company_id`
    pub async fn profile_owned_by(&self, profile_id: Uuid, company_id: Uuid) -> Result<bool, OrderError> {
        Ok(self
            .profiles
            .get(profile_id)
            .await?
            .is_some_and(|profile| profile.is_owned_by(company_id)))
    }

    // ------------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------------

    async fn try_place_order(&self, command: PlaceOrder) -> Result<Order, OrderError> {
        let quantities = validate_items(&command.items)?;

        let profile_active = self
            .profiles
            .get(command.profile_id)
            .await?
            .is_some_and(|profile| profile.active);
        if !profile_active {
            return Err(OrderError::ProfileUnavailable(command.profile_id));
        }

        // Price every item from the catalog; client prices are never trusted
        let mut items = Vec::with_capacity(command.items.len());
        for (requested, quantity) in command.items.iter().zip(quantities) {
            let product = match self.catalog.get(requested.product_id).await? {
                Some(product) if product.can_supply(quantity) => product,
                Some(product) => {
                    return Err(OrderError::ProductUnavailable {
                        product_id: product.id,
                        name: product.name,
                    })
                }
                None => {
                    return Err(OrderError::ProductUnavailable {
                        product_id: requested.product_id,
                        name: requested.product_id.to_string(),
                    })
                }
            };

            if product.profile_id != command.profile_id {
                return Err(OrderError::WrongProfile {
                    product_id: product.id,
                    name: product.name,
                    profile_id: command.profile_id,
                });
            }

            items.push(OrderItem::from_catalog(&product, quantity));
        }

        let reserved = self.reserve_all(&items).await?;

        let now = self.clock.now();
        let order = Order::place(
            Uuid::now_v7(),
            command.customer_id,
            command.profile_id,
            items,
            command.delivery,
            now,
        );

        let event = EventEnvelope::new(
            order.id,
            OrderEvent::Created(OrderCreated {
                customer_id: order.customer_id,
                profile_id: order.profile_id,
                items: order.items.clone(),
                total: order.total,
            }),
            now,
        )
        .with_user(command.requested_by);

        if let Err(e) = self.orders.insert(&order, order.lines(), event).await {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "Failed to persist order, releasing reserved stock"
            );
            self.release(&reserved).await;
            return Err(e.into());
        }

        Ok(order)
    }

    /// Reserve stock for every item in order. On any refusal or failure the
    /// reservations made so far are released before returning.
    async fn reserve_all(&self, items: &[OrderItem]) -> Result<Vec<Restock>, OrderError> {
        let mut reserved: Vec<Restock> = Vec::with_capacity(items.len());

        for item in items {
            match self.catalog.reserve_stock(item.product_id, item.quantity).await {
                Ok(Some(product)) => {
                    tracing::debug!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        remaining = product.stock,
                        available = product.available,
                        "Reserved stock"
                    );
                    reserved.push(Restock {
                        product_id: item.product_id,
                        quantity: item.quantity,
                    });
                }
                Ok(None) => {
                    // Another order took the stock between validation and reservation
                    tracing::warn!(
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        "Stock reservation refused, rolling back"
                    );
                    self.release(&reserved).await;
                    return Err(OrderError::ProductUnavailable {
                        product_id: item.product_id,
                        name: item.product_name.clone(),
                    });
                }
                Err(e) => {
                    tracing::error!(
                        product_id = %item.product_id,
                        error = %e,
                        "Stock reservation failed, rolling back"
                    );
                    self.release(&reserved).await;
                    return Err(e.into());
                }
            }
        }

        Ok(reserved)
    }

    /// Compensation for `reserve_all`. Failures are logged; the caller is
    /// already reporting the error that triggered the rollback.
    async fn release(&self, reserved: &[Restock]) {
        for entry in reserved {
            match self.catalog.restore_stock(entry.product_id, entry.quantity).await {
                Ok(Some(_)) => {}
                Ok(None) => tracing::warn!(
                    product_id = %entry.product_id,
                    quantity = entry.quantity,
                    "Product vanished before its reservation could be released"
                ),
                Err(e) => tracing::error!(
                    product_id = %entry.product_id,
                    quantity = entry.quantity,
                    error = %e,
                    "Failed to release reserved stock"
                ),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Status transitions
    // ------------------------------------------------------------------------

    async fn try_change_status(&self, command: ChangeStatus) -> Result<Order, OrderError> {
        let order = self.get_order(command.order_id).await?;

        if let Some(company_id) = command.company_id {
            if !self.profile_owned_by(order.profile_id, company_id).await? {
                return Err(OrderError::Unauthorized(
                    "You are not allowed to update this order".to_string(),
                ));
            }
        }

        let target = command.target.parse()?;
        let transition = order.plan_transition(target)?;
        let now = self.clock.now();

        let event = match transition {
            Transition::Unchanged if !order.pending_restock.is_empty() => {
                return self.retry_pending_restock(order, command.requested_by, now).await;
            }
            Transition::Unchanged if target == OrderStatus::Cancelled => {
                tracing::debug!(order_id = %order.id, "Order already cancelled");
                return Ok(order);
            }
            // Re-submitting the current status only refreshes the update time
            Transition::Unchanged => OrderEvent::StatusChanged(OrderStatusChanged {
                from: order.status,
                to: target,
            }),
            Transition::Advance { from, to } => OrderEvent::StatusChanged(OrderStatusChanged { from, to }),
            Transition::Cancel { from } => OrderEvent::Cancelled(OrderCancelled {
                from,
                restock: order.restock(),
            }),
        };

        let mut updated = order.clone();
        updated.set_status(target, now);

        // The version guard makes sure only one concurrent cancellation gets
        // past this point, so stock is restored at most once.
        let mut event = EventEnvelope::new(order.id, event, now).with_user(command.requested_by);
        if let Some(company_id) = command.company_id {
            event = event.with_metadata("companyId", company_id.to_string());
        }
        let stored = self.persist(&updated, order.version, event).await?;

        match transition {
            Transition::Unchanged => {
                tracing::debug!(order_id = %order.id, status = %target, "Order status refreshed");
                Ok(stored)
            }
            Transition::Advance { .. } => {
                self.record_transition(&order, target);
                Ok(stored)
            }
            Transition::Cancel { .. } => {
                self.record_transition(&order, target);
                self.restore_cancelled_stock(stored, order.restock(), command.requested_by)
                    .await
            }
        }
    }

    fn record_transition(&self, order: &Order, target: OrderStatus) {
        self.metrics.record_status_transition(order.status, target);
        tracing::info!(
            order_id = %order.id,
            from = %order.status,
            to = %target,
            "Order status changed"
        );
    }

    /// Hand `lines` of a cancelled order back to the catalog. Lines that
    /// fail are stored as pending on the order so a repeated cancellation
    /// can retry them.
    async fn restore_cancelled_stock(
        &self,
        order: Order,
        lines: Vec<Restock>,
        requested_by: Option<Uuid>,
    ) -> Result<Order, OrderError> {
        let mut restored_units: u64 = 0;
        let mut pending: Vec<Restock> = Vec::new();
        let mut first_failure: Option<StoreError> = None;

        for entry in lines {
            match self.catalog.restore_stock(entry.product_id, entry.quantity).await {
                Ok(Some(product)) => {
                    restored_units += u64::from(entry.quantity);
                    tracing::debug!(
                        order_id = %order.id,
                        product_id = %entry.product_id,
                        quantity = entry.quantity,
                        stock = product.stock,
                        "Restored stock"
                    );
                }
                Ok(None) => tracing::warn!(
                    order_id = %order.id,
                    product_id = %entry.product_id,
                    "Product no longer exists, skipping stock restoration"
                ),
                Err(e) => {
                    tracing::error!(
                        order_id = %order.id,
                        product_id = %entry.product_id,
                        quantity = entry.quantity,
                        error = %e,
                        "Failed to restore stock for cancelled order"
                    );
                    pending.push(entry);
                    first_failure.get_or_insert(e);
                }
            }
        }

        self.metrics.record_stock_restored(restored_units);

        let Some(failure) = first_failure else {
            return Ok(order);
        };

        let mut updated = order.clone();
        updated.pending_restock = pending.clone();
        let event = EventEnvelope::new(
            order.id,
            OrderEvent::RestockPending(OrderRestockPending { pending }),
            self.clock.now(),
        )
        .with_user(requested_by);
        if let Err(e) = self.persist(&updated, order.version, event).await {
            tracing::error!(
                order_id = %order.id,
                error = %e,
                "Failed to record pending stock restoration"
            );
        }

        Err(failure.into())
    }

    /// Retry the lines a previous cancellation could not restore
    async fn retry_pending_restock(
        &self,
        order: Order,
        requested_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        // Claimed under the version guard so only one retry restores them
        let mut claimed = order.clone();
        let lines = std::mem::take(&mut claimed.pending_restock);
        claimed.updated_at = Some(now);

        let event = EventEnvelope::new(
            order.id,
            OrderEvent::RestockRetried(OrderRestockRetried { restock: lines.clone() }),
            now,
        )
        .with_user(requested_by);
        let stored = self.persist(&claimed, order.version, event).await?;

        tracing::info!(
            order_id = %order.id,
            lines = lines.len(),
            "Retrying stock restoration for cancelled order"
        );
        self.restore_cancelled_stock(stored, lines, requested_by).await
    }

    // ------------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------------

    async fn try_update_delivery(&self, command: UpdateDelivery) -> Result<Order, OrderError> {
        let order = self.get_order(command.order_id).await?;

        let now = self.clock.now();
        let mut updated = order.clone();
        let change = updated.apply_telemetry(&command.patch, now)?;

        let event = EventEnvelope::new(order.id, OrderEvent::DeliveryUpdated(change), now)
            .with_user(command.requested_by);
        let stored = self.persist(&updated, order.version, event).await?;

        self.metrics.record_delivery_update();
        tracing::debug!(
            order_id = %order.id,
            latitude = ?stored.courier_latitude,
            longitude = ?stored.courier_longitude,
            progress = ?stored.route_progress,
            "Courier telemetry updated"
        );

        Ok(stored)
    }

    async fn try_rate_delivery(&self, command: RateDelivery) -> Result<Order, OrderError> {
        let order = self.get_order(command.order_id).await?;
        let rating = Rating::new(command.rating)?;

        let now = self.clock.now();
        let mut updated = order.clone();
        updated.apply_rating(rating, now);

        let event = EventEnvelope::new(order.id, OrderEvent::Rated(OrderRated { rating: rating.value() }), now)
            .with_user(command.requested_by);
        let stored = self.persist(&updated, order.version, event).await?;

        self.metrics.record_rating(rating.value());
        tracing::info!(order_id = %order.id, rating = rating.value(), "Delivery rated");

        Ok(stored)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    async fn persist(
        &self,
        order: &Order,
        expected_version: i64,
        event: EventEnvelope<OrderEvent>,
    ) -> Result<Order, OrderError> {
        self.orders
            .replace(order, expected_version, event)
            .await
            .map_err(|e| {
                if let StoreError::VersionConflict { .. } = &e {
                    tracing::warn!(order_id = %order.id, error = %e, "Concurrent order modification");
                    return OrderError::Conflict(order.id);
                }
                e.into()
            })
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &Result<T, OrderError>) {
        let error = result.as_ref().err();
        if let Some(e) = error {
            tracing::debug!(operation, reason = e.reason(), error = %e, "Order operation rejected");
        }
        self.metrics
            .record_operation(operation, started.elapsed().as_secs_f64(), error);
    }
}

/// Structural checks on the requested items; returns the quantities as
/// unsigned values in item order.
fn validate_items(items: &[RequestedItem]) -> Result<Vec<u32>, OrderError> {
    if items.is_empty() {
        return Err(OrderError::EmptyItems);
    }

    items
        .iter()
        .map(|item| match u32::try_from(item.quantity) {
            Ok(quantity) if quantity > 0 => Ok(quantity),
            _ => Err(OrderError::InvalidQuantity(item.quantity)),
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================
