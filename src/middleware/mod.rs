//! Middleware module - Rate limiting for the restore API

pub mod rate_limit;

pub use rate_limit::RateLimitLayer;
