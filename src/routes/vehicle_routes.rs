use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::VehicleResponse;
use crate::dto::ApiResponse;
use crate::middleware::{AppPath, CallerId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/available", get(list_available))
        .route("/:id", get(get_vehicle))
}

async fn list_available(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.list_available(user_id).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    CallerId(_): CallerId,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}
