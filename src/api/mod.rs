// ABOUTME: HTTP adapter module for the workflow service
// ABOUTME: Exports the router, shared state, and API error types

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::ApiState;
