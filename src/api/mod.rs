//! HTTP surface: JWT auth and the route handlers.

pub mod auth;
pub mod routes;
