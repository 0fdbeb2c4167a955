use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::billing_dto::{CostEstimateResponse, EstimateCostRequest, InvoiceFilters, InvoiceResponse};
use crate::dto::ApiResponse;
use crate::services::BillingService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct BillingController {
    service: Arc<BillingService>,
}

impl BillingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.billing.clone(),
        }
    }

    pub async fn estimate(
        &self,
        user_id: Uuid,
        request: EstimateCostRequest,
    ) -> Result<ApiResponse<CostEstimateResponse>, AppError> {
        request.validate()?;

        let estimate = self
            .service
            .estimate_cost(user_id, request.vehicle_id, request.hours)
            .await?;

        Ok(ApiResponse::success(estimate.into()))
    }

    pub async fn list_invoices(
        &self,
        user_id: Uuid,
        filters: InvoiceFilters,
    ) -> Result<ApiResponse<Vec<InvoiceResponse>>, AppError> {
        let invoices = self
            .service
            .list_invoices(user_id, filters.unpaid_only)
            .await?
            .into_iter()
            .map(InvoiceResponse::from)
            .collect();

        Ok(ApiResponse::success(invoices))
    }

    pub async fn pay(&self, user_id: Uuid, invoice_id: Uuid) -> Result<ApiResponse<InvoiceResponse>, AppError> {
        let invoice = self.service.pay_invoice(user_id, invoice_id).await?;

        Ok(ApiResponse::success_with_message(
            invoice.into(),
            "Invoice successfully paid".to_string(),
        ))
    }
}
