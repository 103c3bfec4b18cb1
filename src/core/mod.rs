//! Direct Authentication Core Components
//!
//! Core infrastructure: HTTP execution, time, and the shared context.

pub mod clock;
pub mod context;
pub mod transport;

pub use clock::*;
pub use context::{DirectAuthenticationContext, StateCell};
pub use transport::*;
