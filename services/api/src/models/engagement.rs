//! Engagement models
//!
//! Likes and subscriptions are join-table rows whose existence is the
//! payload; they are created and removed through the toggle operation and
//! only surface through views, so no row type is materialized for them.

use serde::Serialize;

/// Outcome of a toggle operation
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Toggled {
    pub created: bool,
}
