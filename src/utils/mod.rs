//! Utility functions shared across the application.
//!
//! - [`code_generator`] - Deterministic short code derivation

pub mod code_generator;
