//! Request handlers module

pub mod auth;
pub mod book;
pub mod discussion;
pub mod group;
