//! `relup config`

use crate::core::context::ReleaseContext;
use crate::core::error::RelupResult;
use crate::release::archive::ArchiveLayout;

/// Print the resolved configuration. The deploy token is never shown.
pub fn run_config(ctx: &ReleaseContext, json: bool) -> RelupResult<()> {
  let config = &ctx.config;

  if json {
    println!("{}", serde_json::to_string_pretty(config)?);
    return Ok(());
  }

  let layout = ArchiveLayout::new(config);
  let config_file = config
    .config_file
    .as_ref()
    .map(|p| p.display().to_string())
    .unwrap_or_else(|| "(none)".to_string());

  println!("⚙️  relup configuration ({})", ctx.root.display());
  println!();
  println!("  project:     {}", config.project);
  println!("  repository:  {}", config.repo_slug());
  println!("  binary:      {}", layout.source.display());
  println!("  archive:     {}", layout.output.display());
  println!("  entry:       {}", layout.entry_path.display());
  println!("  github api:  {}", config.api_url);
  println!(
    "  proxy:       {}",
    config.proxy_url.as_deref().unwrap_or("(unset, required for publish)")
  );
  println!("  config file: {}", config_file);

  Ok(())
}
