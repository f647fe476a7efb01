//! Release context - build once in main.rs, pass to every command

use crate::core::config::{Overrides, ReleaseConfig};
use crate::core::error::RelupResult;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Everything a command needs to know about the invocation
#[derive(Debug, Clone)]
pub struct ReleaseContext {
  /// Working directory the tool was started in
  pub root: PathBuf,

  /// Resolved configuration
  pub config: ReleaseConfig,

  /// stderr is a terminal (progress bars are drawn only then)
  pub interactive: bool,
}

impl ReleaseContext {
  /// Resolve configuration against `root` and the process environment
  pub fn build(root: &Path, overrides: &Overrides) -> RelupResult<Self> {
    let config = ReleaseConfig::load(root, overrides)?;
    tracing::debug!(?config, "configuration resolved");

    Ok(Self {
      root: root.to_path_buf(),
      config,
      interactive: std::io::stderr().is_terminal(),
    })
  }
}
