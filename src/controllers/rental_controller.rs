use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::rental_dto::{CompletionResponse, CreateRentalRequest, ExtendRentalRequest, RentalResponse};
use crate::dto::ApiResponse;
use crate::services::RentalService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct RentalController {
    service: Arc<RentalService>,
}

impl RentalController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.rentals.clone(),
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        request.validate()?;

        let rental = self
            .service
            .create_rental(user_id, request.vehicle_id, request.hours)
            .await?;

        Ok(ApiResponse::success_with_message(
            RentalResponse::from_rental(rental, self.service.zone()),
            "Rental created successfully".to_string(),
        ))
    }

    pub async fn cancel(&self, user_id: Uuid) -> Result<ApiResponse<RentalResponse>, AppError> {
        let rental = self.service.cancel_rental(user_id).await?;

        Ok(ApiResponse::success_with_message(
            RentalResponse::from_rental(rental, self.service.zone()),
            "Rental cancelled successfully".to_string(),
        ))
    }

    pub async fn extend(
        &self,
        user_id: Uuid,
        request: ExtendRentalRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        request.validate()?;

        let rental = self.service.extend_rental(user_id, request.hours).await?;

        Ok(ApiResponse::success_with_message(
            RentalResponse::from_rental(rental, self.service.zone()),
            "Rental extended successfully".to_string(),
        ))
    }

    pub async fn complete(&self, user_id: Uuid) -> Result<ApiResponse<CompletionResponse>, AppError> {
        let completion = self.service.complete_rental(user_id).await?;

        Ok(ApiResponse::success_with_message(
            CompletionResponse::from_completion(completion, self.service.zone()),
            "Rental completed successfully".to_string(),
        ))
    }

    pub async fn active(&self, user_id: Uuid) -> Result<ApiResponse<RentalResponse>, AppError> {
        let rental = self.service.active_rental(user_id).await?;
        Ok(ApiResponse::success(RentalResponse::from_rental(rental, self.service.zone())))
    }

    pub async fn history(&self, user_id: Uuid) -> Result<ApiResponse<Vec<RentalResponse>>, AppError> {
        let zone = self.service.zone();
        let rentals = self
            .service
            .list_rentals(user_id)
            .await?
            .into_iter()
            .map(|r| RentalResponse::from_rental(r, zone))
            .collect();

        Ok(ApiResponse::success(rentals))
    }
}
