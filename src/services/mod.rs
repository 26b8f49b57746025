//! Services layer - Business logic
//!
//! Services coordinate repositories and own the error taxonomy that the API
//! layer turns into responses.

pub mod history;

pub use history::{HistoryError, HistoryService};
