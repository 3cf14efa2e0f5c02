//! Iris Gateway HTTP API Server
//!
//! Exposes the description and read-aloud pipelines over multipart uploads.

pub mod error;
pub mod routes;
pub mod server;
mod upload;


pub use error::ApiError;
pub use server::{GatewayState, router, start_server};
