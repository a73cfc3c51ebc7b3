//! Shared types and delivery rules for the Mulch Dispatch platform
//!
//! This crate contains the domain models, the delivery status engine and the
//! aggregate rollups used by the backend and the browser (via WASM).

pub mod assignment;
pub mod delivery;
pub mod error;
pub mod models;
pub mod rollup;
pub mod types;
pub mod validation;

pub use assignment::*;
pub use delivery::*;
pub use error::*;
pub use models::*;
pub use rollup::*;
pub use types::*;
pub use validation::*;
