//! HTTP handlers module
//!
//! Admin, private and public handlers of the main service, the stats
//! service handlers, and the extractors and error mapping they share.

pub mod admin;
pub mod error;
pub mod extract;
pub mod health;
pub mod private;
pub mod public;
pub mod stats;

pub use error::ApiError;
pub use extract::{ClientIp, PathParams, QueryParams, ValidJson};
