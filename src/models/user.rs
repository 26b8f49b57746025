//! User model

use serde::{Deserialize, Serialize};

/// A registered user. Read-only from the history service's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub user_id: i64,
    /// Login name (unique); matches the `username` session attribute
    pub username: String,
}
