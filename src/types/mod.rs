//! Direct Authentication Types
//!
//! Core type definitions for direct authentication operations.

pub mod binding;
pub mod config;
pub mod factor;
pub mod grant;
pub mod token;

pub use binding::*;
pub use config::*;
pub use factor::*;
pub use grant::*;
pub use token::*;
