//! # Todo API
//!
//! A small todo list service: projects that own tasks, stored in SQLite and
//! served as JSON over HTTP.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP request
//!        │
//!        ▼
//!   ┌──────────┐    ┌────────────┐    ┌──────────────────────┐
//!   │  Router  │───▶│  Handlers  │───▶│ TodoStore            │
//!   │ (axum)   │    │ (api/*)    │    │ SqliteStore          │
//!   └──────────┘    └────────────┘    │ MemoryStore (tests)  │
//!                                     └──────────────────────┘
//! ```
//!
//! ## Modules
//! - `api`: routes, handlers and the JSON error envelope
//! - `config`: environment-driven server configuration
//! - `model`: `Project` and `Task` records
//! - `store`: the `TodoStore` trait and its implementations

pub mod api;
pub mod config;
pub mod model;
pub mod store;

pub use config::Config;
pub use model::{NewTask, Priority, Project, Task};
pub use store::{MemoryStore, SharedStore, SqliteStore, StoreError, StoreResult, TodoStore};
