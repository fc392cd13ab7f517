//! HTTP API.
//!
//! Routes:
//! - `/projects` and `/projects/:project` (+ `/archive`)
//! - `/projects/:project/tasks` and `/projects/:project/tasks/:task` (+ `/complete`)
//!
//! Errors and plain acknowledgements are sent as `{"message": "..."}`;
//! successful reads return the JSON-encoded record(s).

mod error;
mod projects;
mod routes;
mod tasks;

pub use error::{ApiError, ApiPath, MessageResponse};
pub use routes::{router, serve, AppState};
