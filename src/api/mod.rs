//! API layer - HTTP handlers and middleware
//!
//! Everything HTTP: handlers per resource, session authentication and
//! rate limiting middleware, the validating JSON extractor, the router and
//! the OpenAPI document.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
