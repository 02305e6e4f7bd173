use actix_web::{http::header, web, HttpResponse};
use uuid::Uuid;

use super::dto::{CreateOrderRequest, RateDeliveryRequest, UpdateStatusRequest};
use super::error::ApiError;
use crate::domain::order::{
    ChangeStatus, Order, OrderError, OrderStatus, RateDelivery, TelemetryPatch, UpdateDelivery,
};
use crate::domain::Caller;
use crate::state::AppState;

// ============================================================================
// Order Handlers
// ============================================================================
//
// Role rules live here; the engine only knows about company scoping for
// status changes.
//
// ============================================================================

type ApiResult = Result<HttpResponse, ApiError>;

/// POST /api/pedidos
pub async fn create_order(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Json<CreateOrderRequest>,
) -> ApiResult {
    let body = body.into_inner();

    let customer_id = match caller {
        Caller::Customer { user_id } => user_id,
        Caller::Admin { .. } => body.customer_id.ok_or(OrderError::MissingCustomer)?,
        Caller::Company { .. } => {
            return Err(ApiError::Forbidden("Only customers can place orders".to_string()))
        }
    };

    let order = state
        .orders
        .place_order(body.into_command(customer_id, caller.user_id()))
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/pedidos/{}", order.id)))
        .json(order))
}

/// GET /api/pedidos/{id}
pub async fn get_order(state: web::Data<AppState>, caller: Caller, path: web::Path<Uuid>) -> ApiResult {
    let order = state.orders.get_order(path.into_inner()).await?;
    ensure_involved(&state, &caller, &order, "You are not allowed to view this order").await?;
    Ok(HttpResponse::Ok().json(order))
}

/// GET /api/pedidos/{id}/productos
pub async fn order_lines(state: web::Data<AppState>, caller: Caller, path: web::Path<Uuid>) -> ApiResult {
    let order = state.orders.get_order(path.into_inner()).await?;
    ensure_involved(&state, &caller, &order, "You are not allowed to view this order").await?;
    Ok(HttpResponse::Ok().json(state.orders.order_lines(order.id).await?))
}

/// GET /api/pedidos/{id}/historial
pub async fn order_history(state: web::Data<AppState>, caller: Caller, path: web::Path<Uuid>) -> ApiResult {
    let order = state.orders.get_order(path.into_inner()).await?;
    ensure_involved(&state, &caller, &order, "You are not allowed to view this order").await?;
    Ok(HttpResponse::Ok().json(state.orders.order_history(order.id).await?))
}

/// GET /api/pedidos/mis-pedidos
pub async fn my_orders(state: web::Data<AppState>, caller: Caller) -> ApiResult {
    let orders = match caller {
        Caller::Customer { user_id } => state.orders.orders_for_customer(user_id).await?,
        Caller::Company { company_id, .. } => state.orders.orders_for_company(company_id).await?,
        Caller::Admin { .. } => state.orders.all_orders().await?,
    };
    Ok(HttpResponse::Ok().json(orders))
}

/// GET /api/pedidos/perfil/{id}
pub async fn profile_orders(state: web::Data<AppState>, caller: Caller, path: web::Path<Uuid>) -> ApiResult {
    let profile_id = path.into_inner();

    match caller {
        Caller::Admin { .. } => {}
        Caller::Company { company_id, .. } => {
            if !state.orders.profile_owned_by(profile_id, company_id).await? {
                return Err(ApiError::Forbidden(
                    "You are not allowed to view this profile's orders".to_string(),
                ));
            }
        }
        Caller::Customer { .. } => {
            return Err(ApiError::Forbidden(
                "Only companies can list a profile's orders".to_string(),
            ))
        }
    }

    Ok(HttpResponse::Ok().json(state.orders.orders_for_profile(profile_id).await?))
}

/// PUT /api/pedidos/{id}/estado
pub async fn update_status(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> ApiResult {
    let order_id = path.into_inner();
    let target = body.into_inner().status;

    let company_id = match caller {
        Caller::Customer { user_id } => {
            let order = state.orders.get_order(order_id).await?;
            if !order.belongs_to_customer(user_id) {
                return Err(ApiError::Forbidden(
                    "You are not allowed to update this order".to_string(),
                ));
            }
            let requested: OrderStatus = target.parse()?;
            if requested != OrderStatus::Cancelled {
                return Err(ApiError::Forbidden(
                    "Customers can only cancel their orders".to_string(),
                ));
            }
            None
        }
        Caller::Company { company_id, .. } => Some(company_id),
        Caller::Admin { .. } => None,
    };

    let order = state
        .orders
        .change_status(ChangeStatus {
            order_id,
            target,
            company_id,
            requested_by: Some(caller.user_id()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// PUT /api/pedidos/{id}/repartidor
pub async fn update_delivery(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<TelemetryPatch>,
) -> ApiResult {
    let order = state.orders.get_order(path.into_inner()).await?;
    ensure_involved(&state, &caller, &order, "You are not allowed to update this order").await?;

    let order = state
        .orders
        .update_delivery(UpdateDelivery {
            order_id: order.id,
            patch: body.into_inner(),
            requested_by: Some(caller.user_id()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// PUT /api/pedidos/{id}/puntuacion
pub async fn rate_delivery(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<Uuid>,
    body: web::Json<RateDeliveryRequest>,
) -> ApiResult {
    let order = state.orders.get_order(path.into_inner()).await?;

    let Caller::Customer { user_id } = caller else {
        return Err(ApiError::Forbidden("Only customers can rate deliveries".to_string()));
    };
    if !order.belongs_to_customer(user_id) {
        return Err(ApiError::Forbidden("You are not allowed to rate this order".to_string()));
    }

    let order = state
        .orders
        .rate_delivery(RateDelivery {
            order_id: order.id,
            rating: body.into_inner().rating,
            requested_by: Some(user_id),
        })
        .await?;

    Ok(HttpResponse::Ok().json(order))
}

/// DELETE /api/pedidos/{id}
pub async fn delete_order(state: web::Data<AppState>, caller: Caller, path: web::Path<Uuid>) -> ApiResult {
    if !matches!(caller, Caller::Admin { .. }) {
        return Err(ApiError::Forbidden("Only administrators can delete orders".to_string()));
    }

    state
        .orders
        .delete_order(path.into_inner(), Some(caller.user_id()))
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// The owning customer, a company owning the order's profile, or an admin
async fn ensure_involved(
    state: &AppState,
    caller: &Caller,
    order: &Order,
    denial: &str,
) -> Result<(), ApiError> {
    let allowed = match *caller {
        Caller::Admin { .. } => true,
        Caller::Customer { user_id } => order.belongs_to_customer(user_id),
        Caller::Company { company_id, .. } => {
            state.orders.profile_owned_by(order.profile_id, company_id).await?
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden(denial.to_string()))
    }
}
