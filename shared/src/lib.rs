//! Shared types for the Crab booking service
//!
//! Wire models and the unified error system used by the server and
//! its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
