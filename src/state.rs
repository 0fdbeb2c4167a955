//! Shared application state
//!
//! Holds the services and configuration handed to every axum handler.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::RentalStore;
use crate::services::{BillingService, RentalPolicy, RentalService, VehicleService};
use crate::utils::jwt::JwtConfig;
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: JwtConfig,
    pub store: Arc<dyn RentalStore>,
    pub rentals: Arc<RentalService>,
    pub billing: Arc<BillingService>,
    pub vehicles: Arc<VehicleService>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, store: Arc<dyn RentalStore>, clock: Arc<dyn Clock>) -> Self {
        let policy = RentalPolicy {
            cancellation_window: config.cancellation_window,
        };

        Self {
            jwt: JwtConfig::from(&config),
            rentals: Arc::new(RentalService::new(
                store.clone(),
                clock,
                config.operating_zone,
                policy,
            )),
            billing: Arc::new(BillingService::new(store.clone())),
            vehicles: Arc::new(VehicleService::new(store.clone())),
            store,
            config: Arc::new(config),
        }
    }
}
