//! Integration tests for relup
//!
//! Each test runs the compiled binary in a temporary project directory,
//! with the secret proxy and GitHub API replaced by wiremock stubs.

mod test_config;
mod test_publish;
