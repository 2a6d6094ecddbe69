/*
 * Responsibility
 * - Public surface of v1 (routes() and the edge-function compatible routes)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{compat_routes, routes};
