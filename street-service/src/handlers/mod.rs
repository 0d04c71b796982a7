pub mod health;
pub mod streets;
pub mod users;

pub use health::{health_check, metrics_endpoint, readiness_check};
