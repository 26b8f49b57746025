//! Database layer
//!
//! Supports SQLite (default, single-file deployment) and MySQL (the
//! production EnerTrack database). The driver is selected by
//! configuration and hidden behind [`DatabasePool`].

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
