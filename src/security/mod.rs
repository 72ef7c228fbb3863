//! Request and URL safety policies.
//!
//! This layer owns everything that decides whether input is safe to act on:
//!
//! - [`url_validator`] - Validation pipeline for submitted URLs
//! - [`ssrf`] - Blocked host and address checks backing the validator
//! - [`identity`] - Rate-limit identity derivation

pub mod identity;
pub mod ssrf;
pub mod url_validator;

pub use url_validator::{UrlRejection, UrlValidator};
