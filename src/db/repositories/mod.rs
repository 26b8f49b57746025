//! Database repositories
//!
//! Read-side data access for the history service. Each repository is a
//! trait plus an sqlx implementation covering SQLite and MySQL.

pub mod history;
pub mod session;
pub mod user;

pub use history::{HistoryQueryError, HistoryRepository, SqlxHistoryRepository};
pub use session::{SessionStore, SqlxSessionStore};
pub use user::{SqlxUserRepository, UserRepository};
