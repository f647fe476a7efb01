//! `relup package`

use crate::core::context::ReleaseContext;
use crate::core::error::RelupResult;
use crate::release::archive;

/// Build the release archive without touching the network
pub fn run_package(ctx: &ReleaseContext, json: bool) -> RelupResult<()> {
  let archive = archive::package(&ctx.config)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&archive)?);
    return Ok(());
  }

  println!("📦 Packaged {}", archive.file_name);
  println!("   entry:  {}", archive.entry);
  println!("   path:   {}", archive.path.display());
  println!("   size:   {} bytes", archive.size);
  println!("   sha256: {}", archive.sha256);

  Ok(())
}
