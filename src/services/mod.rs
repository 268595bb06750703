pub mod aggregation;
pub mod auth_service;
pub mod session_service;
