//! Shared building blocks for the student records workspace:
//! logging setup, startup environment checks, Prometheus metrics and
//! the admin HTTP endpoint that exposes them.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
pub mod admin_http;
