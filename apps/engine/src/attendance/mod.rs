pub mod anomaly;
pub mod handlers;
