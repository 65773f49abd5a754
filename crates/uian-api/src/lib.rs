//! # uian-api
//!
//! HTTP API server for uian: case CRUD, the advisory chat endpoint, and
//! the embedding sync endpoints.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::app;
pub use state::AppState;
