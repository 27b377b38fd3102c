//! Background jobs that run alongside the HTTP server.

mod user_count;

pub use user_count::{REPORT_INTERVAL, UserCountReporter};
