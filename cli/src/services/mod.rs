pub mod collector_service;
pub mod csv_service;

pub use collector_service::*;
pub use csv_service::*;
