//! HTTP server: router assembly, shared state, health checks, and the
//! domain-error-to-HTTP bridge.

pub mod error;
pub mod health;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
