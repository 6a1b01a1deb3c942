//! Gateway types
//!
//! - [`response`]: JSON bodies returned to the embedded frontend

pub mod response;

pub use response::{ActionResponse, ProductCountResponse, UsageResponse};
