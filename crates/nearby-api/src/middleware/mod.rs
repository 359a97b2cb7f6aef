//! HTTP middleware: metrics and security headers
//!
//! Author: hephaex@gmail.com

pub mod metrics;
pub mod security_headers;

pub use metrics::{metrics_middleware, record_auth_event, AuthEvent};
pub use security_headers::security_headers_middleware;
