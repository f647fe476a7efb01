//! Core building blocks shared by every command
//!
//! - **config**: relup.toml, environment and CLI resolution
//! - **context**: resolved configuration built once in main
//! - **error**: error types with contextual help and exit codes

pub mod config;
pub mod context;
pub mod error;
