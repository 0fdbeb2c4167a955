//! EV rental engine
//!
//! Vehicle bookings, the availability ledger, the rental lifecycle and
//! billing, served over HTTP by the `ev_rental` binary.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
