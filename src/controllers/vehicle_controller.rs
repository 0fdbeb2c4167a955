use std::sync::Arc;

use uuid::Uuid;

use crate::dto::vehicle_dto::VehicleResponse;
use crate::dto::ApiResponse;
use crate::services::VehicleService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct VehicleController {
    service: Arc<VehicleService>,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.vehicles.clone(),
        }
    }

    pub async fn list_available(&self, user_id: Uuid) -> Result<ApiResponse<Vec<VehicleResponse>>, AppError> {
        let vehicles = self
            .service
            .list_available_for(user_id)
            .await?
            .into_iter()
            .map(VehicleResponse::from)
            .collect();

        Ok(ApiResponse::success(vehicles))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let vehicle = self.service.get_vehicle(id).await?;
        Ok(ApiResponse::success(vehicle.into()))
    }
}
