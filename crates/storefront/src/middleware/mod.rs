//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (per-request hub, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and isolation headers)

pub mod request_id;
pub mod security_headers;

pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
