//! Common library for the clipstream backend
//!
//! This crate provides shared infrastructure used by the clipstream
//! services: PostgreSQL connection pooling, health checks, and the
//! shared database error types.

pub mod database;
pub mod error;
