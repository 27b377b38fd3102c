//! Middleware components for request processing.
//!
//! Request ID tracking, request logging, bearer authentication, and the
//! mapping of `AppError` and panics to JSON error responses.

mod auth;
mod error_handler;
mod logging;
mod request_id;

pub use auth::{AuthUser, auth_middleware};
pub use error_handler::{handle_panic, route_not_found};
pub use logging::logging_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
