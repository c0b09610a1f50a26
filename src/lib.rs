//! Bookclub - a reading group coordination service
//!
//! Users form time-boxed groups around a book, join groups up to a fixed
//! capacity, and hold threaded discussions scoped to group membership.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
