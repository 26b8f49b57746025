//! Data models
//!
//! Entities read from the database: sessions, users, categories and
//! device usage records.

mod category;
mod session;
mod usage_record;
mod user;

pub use category::Category;
pub use session::{Session, SessionAttributeError, SessionData};
pub use usage_record::{UsageRecord, UsageWithCategory};
pub use user::User;
