//! Release asset publishing
//!
//! A strictly sequential pipeline, stopping at the first error:
//!
//! 1. **archive**: `target/release/<name>` → `<name>-linux-x86_64.tar.gz`
//! 2. **secret**: deploy token from the Taskcluster secrets proxy
//! 3. **github**: resolve `mozilla/<name>`, its latest release, upload the archive
//!
//! The archive is built before any network call so a missing binary fails
//! fast. Nothing is retried.

pub mod archive;
pub mod github;
pub mod secret;

#[cfg(test)]
pub(crate) mod stub;

use crate::core::config::ReleaseConfig;
use crate::core::error::RelupResult;
use archive::PackagedArchive;
use github::{GithubClient, OCTET_STREAM, ReleaseAsset};
use reqwest::blocking::Client;
use serde::Serialize;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client shared by the secret and GitHub steps
///
/// Client defaults apply for timeouts.
pub(crate) fn http_client() -> RelupResult<Client> {
  Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
  /// Resolve everything but skip the upload
  pub dry_run: bool,
  /// Draw an upload progress bar
  pub progress: bool,
}

/// Outcome of a publish run
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
  pub project: String,
  pub repository: String,
  pub release_tag: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub release_url: Option<String>,
  pub archive: PackagedArchive,
  /// `None` on dry runs
  #[serde(skip_serializing_if = "Option::is_none")]
  pub asset: Option<ReleaseAsset>,
  pub dry_run: bool,
}

/// Package the binary and attach it to the latest release
pub fn publish(config: &ReleaseConfig, options: PublishOptions) -> RelupResult<PublishReport> {
  // Config problems surface before any work is done
  config.require_proxy_url()?;

  let archive = archive::package(config)?;

  let token = secret::fetch_deploy_token(config)?;
  let github = GithubClient::new(&config.api_url, token)?;

  let repo = github.repository(&config.owner, &config.project)?;
  let release = github.latest_release(&repo)?;
  tracing::info!(repository = %repo.full_name, tag = %release.tag_name, release_id = release.id, "latest release resolved");

  let asset = if options.dry_run {
    tracing::info!(archive = %archive.file_name, "dry run, upload skipped");
    None
  } else {
    let asset = github.upload_asset(&release, &archive, OCTET_STREAM, options.progress)?;
    tracing::info!(asset = %asset.name, asset_id = asset.id, tag = %release.tag_name, "asset uploaded");
    Some(asset)
  };

  Ok(PublishReport {
    project: config.project.clone(),
    repository: repo.full_name,
    release_tag: release.tag_name,
    release_url: release.html_url,
    archive,
    asset,
    dry_run: options.dry_run,
  })
}
