//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic. Creation input
//! uses separate `New*` structs so callers cannot supply server-assigned
//! fields such as ids or short codes.

pub mod link;

pub use link::{Link, NewLink};
