//! Builders
//!
//! Fluent builder patterns for direct authentication configuration.

pub mod config;

pub use config::{direct_auth_context, DirectAuthenticationContextBuilder};
