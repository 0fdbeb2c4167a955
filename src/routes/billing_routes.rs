use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::billing_controller::BillingController;
use crate::dto::billing_dto::{CostEstimateResponse, EstimateCostRequest, InvoiceFilters, InvoiceResponse};
use crate::dto::ApiResponse;
use crate::middleware::{AppJson, AppPath, AppQuery, CallerId};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_billing_router() -> Router<AppState> {
    Router::new()
        .route("/estimate", post(estimate_cost))
        .route("/invoices", get(list_invoices))
        .route("/invoices/:id/pay", post(pay_invoice))
}

async fn estimate_cost(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    AppJson(request): AppJson<EstimateCostRequest>,
) -> Result<Json<ApiResponse<CostEstimateResponse>>, AppError> {
    let controller = BillingController::new(&state);
    let response = controller.estimate(user_id, request).await?;
    Ok(Json(response))
}

async fn list_invoices(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    AppQuery(filters): AppQuery<InvoiceFilters>,
) -> Result<Json<ApiResponse<Vec<InvoiceResponse>>>, AppError> {
    let controller = BillingController::new(&state);
    let response = controller.list_invoices(user_id, filters).await?;
    Ok(Json(response))
}

async fn pay_invoice(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<InvoiceResponse>>, AppError> {
    let controller = BillingController::new(&state);
    let response = controller.pay(user_id, id).await?;
    Ok(Json(response))
}
