//! EnerTrack - household electricity tracking backend
//!
//! This library serves the device usage history of logged-in users.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
