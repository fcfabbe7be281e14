pub mod forecast;
pub mod handlers;
