//! HTTP API handlers for veracity-verify

pub mod health;
pub mod history;
pub mod verify;

pub use health::health_routes;
pub use history::history_routes;
pub use verify::verify_routes;
