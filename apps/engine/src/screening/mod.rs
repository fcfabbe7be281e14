pub mod composite;
pub mod handlers;
pub mod ranking;
pub mod skill_gap;
