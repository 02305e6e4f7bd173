// ============================================================================
// HTTP API - /api/pedidos
// ============================================================================

pub mod caller;
mod dto;
mod error;
mod handlers;

use actix_web::web;

pub use error::ApiError;

/// Register the order routes. Literal segments are registered before `{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/pedidos")
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
            )
            .app_data(
                web::PathConfig::default()
                    .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
            )
            .route("", web::post().to(handlers::create_order))
            .route("/mis-pedidos", web::get().to(handlers::my_orders))
            .route("/perfil/{profile_id}", web::get().to(handlers::profile_orders))
            .route("/{id}", web::get().to(handlers::get_order))
            .route("/{id}", web::delete().to(handlers::delete_order))
            .route("/{id}/productos", web::get().to(handlers::order_lines))
            .route("/{id}/historial", web::get().to(handlers::order_history))
            .route("/{id}/estado", web::put().to(handlers::update_status))
            .route("/{id}/repartidor", web::put().to(handlers::update_delivery))
            .route("/{id}/puntuacion", web::put().to(handlers::rate_delivery)),
    );
}
