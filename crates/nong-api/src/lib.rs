//! HTTP surface of the assignment service.
//!
//! [`HttpApi`] mounts the routes on an axum [`axum::Router`] and delegates to
//! an [`ApiHandler`]; [`AssignerAdapter`] is the handler backed by the core
//! engine.
mod adapter;
pub use adapter::AssignerAdapter;

mod error;
pub use error::ApiError;

mod handler;
pub use handler::{ApiHandler, Assignment, RegistrantView};

mod http;
pub use http::HttpApi;
