//! HTTP routes
//!
//! One router per resource, nested under `/api` and wrapped with tracing and
//! CORS layers.

pub mod billing_routes;
pub mod rental_routes;
pub mod vehicle_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Full application router
pub fn create_app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/rentals", rental_routes::create_rental_router())
        .nest("/api/billing", billing_routes::create_billing_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Liveness, including a round trip to the store
async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.store.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
