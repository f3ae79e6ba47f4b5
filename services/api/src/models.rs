//! Persisted entity models and request payloads

pub mod comment;
pub mod engagement;
pub mod playlist;
pub mod tweet;
pub mod user;
pub mod video;
