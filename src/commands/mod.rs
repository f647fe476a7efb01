//! CLI commands for relup
//!
//! - **publish**: package the binary and upload it to the latest release
//! - **package**: build the archive only, no network access
//! - **config**: show the resolved configuration
//!
//! All commands accept `&ReleaseContext`, built once in main.

pub mod config;
pub mod package;
pub mod publish;

pub use config::run_config;
pub use package::run_package;
pub use publish::run_publish;
