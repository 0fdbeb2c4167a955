pub mod billing_controller;
pub mod rental_controller;
pub mod vehicle_controller;
