//! Entity module - SeaORM entity definitions
//!
//! One module per table, plus the response shapes derived from each model.

pub mod book;
pub mod chapter;
pub mod comment;
pub mod discussion_post;
pub mod group_membership;
pub mod reading_group;
pub mod user;
