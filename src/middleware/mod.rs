//! Middleware module
//!
//! This module contains middleware shared by both HTTP services

pub mod logging;

pub use logging::{http_trace_layer, RequestSpan, REQUEST_ID_HEADER};
