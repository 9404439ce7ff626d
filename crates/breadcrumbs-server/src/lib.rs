//! Breadcrumbs Server
//!
//! Thin HTTP surface over [`breadcrumbs_core::FrontDoor`]. Handlers translate
//! JSON to front door calls and [`breadcrumbs_core::FrontDoorError`] to
//! status codes; nothing else lives here.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, ServerError, ServerResult};
pub use server::{router, run, AppState};
