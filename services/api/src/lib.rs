//! Clipstream API service
//!
//! The binary in `main.rs` wires these modules together; they are exposed
//! as a library so the integration tests under `tests/` can drive the
//! repositories and views against a real database.

pub mod assets;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
pub mod view;
pub mod views;
