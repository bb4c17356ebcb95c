//! # Axum Helpers
//!
//! Shared HTTP plumbing for the service binaries.
//!
//! - **[`server`]**: router assembly, health and readiness, graceful shutdown
//! - **[`errors`]**: structured JSON error responses with stable error codes

pub mod errors;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ReadyResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use errors::{AppError, ErrorCode, ErrorResponse};
