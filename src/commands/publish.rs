//! `relup publish`

use crate::core::context::ReleaseContext;
use crate::core::error::RelupResult;
use crate::release::{self, PublishOptions, PublishReport};

/// Package, fetch the deploy token, upload to the latest release
pub fn run_publish(ctx: &ReleaseContext, dry_run: bool, json: bool) -> RelupResult<()> {
  let options = PublishOptions {
    dry_run,
    progress: ctx.interactive && !json,
  };
  let report = release::publish(&ctx.config, options)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }

  Ok(())
}

fn print_report(report: &PublishReport) {
  println!("📦 {} ({} bytes)", report.archive.file_name, report.archive.size);
  println!("   sha256: {}", report.archive.sha256);
  println!("🏷️  {} @ {}", report.repository, report.release_tag);

  match &report.asset {
    Some(asset) => {
      println!("✅ Uploaded {} (asset id {})", asset.name, asset.id);
      if let Some(url) = &asset.browser_download_url {
        println!("   {}", url);
      }
    }
    None => {
      println!("🔍 Dry-run mode (upload skipped)");
      if let Some(url) = &report.release_url {
        println!("   would upload to {}", url);
      }
    }
  }
}
