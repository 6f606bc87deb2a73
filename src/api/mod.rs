//! HTTP API module - Router and request handlers

pub mod handlers;
pub mod routes;
