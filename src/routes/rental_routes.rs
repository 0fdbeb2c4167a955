use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::rental_controller::RentalController;
use crate::dto::rental_dto::{CompletionResponse, CreateRentalRequest, ExtendRentalRequest, RentalResponse};
use crate::dto::ApiResponse;
use crate::middleware::{AppJson, CallerId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rental_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rental).get(list_rentals))
        .route("/active", get(active_rental))
        .route("/active/cancel", post(cancel_rental))
        .route("/active/extend", post(extend_rental))
        .route("/active/complete", post(complete_rental))
}

async fn create_rental(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    AppJson(request): AppJson<CreateRentalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RentalResponse>>), AppError> {
    let controller = RentalController::new(&state);
    let response = controller.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_rentals(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<ApiResponse<Vec<RentalResponse>>>, AppError> {
    let controller = RentalController::new(&state);
    let response = controller.history(user_id).await?;
    Ok(Json(response))
}

async fn active_rental(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(&state);
    let response = controller.active(user_id).await?;
    Ok(Json(response))
}

async fn cancel_rental(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(&state);
    let response = controller.cancel(user_id).await?;
    Ok(Json(response))
}

async fn extend_rental(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    AppJson(request): AppJson<ExtendRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let controller = RentalController::new(&state);
    let response = controller.extend(user_id, request).await?;
    Ok(Json(response))
}

async fn complete_rental(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<ApiResponse<CompletionResponse>>, AppError> {
    let controller = RentalController::new(&state);
    let response = controller.complete(user_id).await?;
    Ok(Json(response))
}
