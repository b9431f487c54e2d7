//! HTTP API
//! Mission: Router assembly and domain route handlers

pub mod routes;

pub use routes::{create_router, AppState};
