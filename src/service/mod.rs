//! Service module
//!
//! Business logic between the HTTP handlers and the entity store. Caller
//! identity is an explicit `user_id` parameter on every operation; nothing in
//! here reads ambient session state or caches authorization decisions.

pub mod discussion;
pub mod group;
pub mod membership;
