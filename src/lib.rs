// Wellness Sentinel - library root for the binary and integration tests

pub mod catalog;
pub mod config;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod risk;
pub mod routes;
pub mod search;
pub mod store;
pub mod symptom;
pub mod utils;
