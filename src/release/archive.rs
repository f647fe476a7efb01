//! Release archive creation
//!
//! Wraps `<build_dir>/<project>` in `<project>-<platform>.tar.gz`, stored
//! under `<project>-<platform>/<project>` inside the archive.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ArchiveError, RelupError, RelupResult, ResultExt};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Names and paths derived from the project name and platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
  /// `<project>-<platform>`
  pub base_dir: String,
  /// `<project>-<platform>.tar.gz`
  pub archive_name: String,
  /// Compiled binary on disk
  pub source: PathBuf,
  /// Path of the binary inside the archive
  pub entry_path: PathBuf,
  /// Where the archive is written
  pub output: PathBuf,
}

impl ArchiveLayout {
  pub fn new(config: &ReleaseConfig) -> Self {
    let base_dir = format!("{}-{}", config.project, config.platform);
    let archive_name = format!("{}.tar.gz", base_dir);

    Self {
      source: config.build_dir.join(&config.project),
      entry_path: Path::new(&base_dir).join(&config.project),
      output: config.output_dir.join(&archive_name),
      base_dir,
      archive_name,
    }
  }
}

/// A written archive, ready for upload
#[derive(Debug, Clone, Serialize)]
pub struct PackagedArchive {
  pub path: PathBuf,
  pub file_name: String,
  pub entry: String,
  pub size: u64,
  pub sha256: String,
}

/// Build the release archive for the configured project
///
/// The source binary is checked before the output file is created, so a
/// missing binary never leaves an empty archive behind.
pub fn package(config: &ReleaseConfig) -> RelupResult<PackagedArchive> {
  let layout = ArchiveLayout::new(config);

  let metadata = match fs::metadata(&layout.source) {
    Ok(metadata) => metadata,
    Err(err) if err.kind() == io::ErrorKind::NotFound => {
      return Err(RelupError::Archive(ArchiveError::SourceNotFound {
        path: layout.source.clone(),
      }));
    }
    Err(err) => {
      return Err(err).with_context(|| format!("Failed to stat {}", layout.source.display()));
    }
  };
  if !metadata.is_file() {
    return Err(RelupError::Archive(ArchiveError::SourceNotFile {
      path: layout.source.clone(),
    }));
  }

  tracing::debug!(source = %layout.source.display(), output = %layout.output.display(), "creating archive");

  fs::create_dir_all(&config.output_dir)
    .with_context(|| format!("Failed to create output directory {}", config.output_dir.display()))?;
  write_archive(&layout).with_context(|| format!("Failed to write archive {}", layout.output.display()))?;

  let (size, sha256) = digest_file(&layout.output)?;

  tracing::info!(
    archive = %layout.archive_name,
    entry = %layout.entry_path.display(),
    size,
    sha256 = %sha256,
    "archive created"
  );

  Ok(PackagedArchive {
    path: layout.output,
    file_name: layout.archive_name,
    entry: layout.entry_path.to_string_lossy().replace('\\', "/"),
    size,
    sha256,
  })
}

fn write_archive(layout: &ArchiveLayout) -> io::Result<()> {
  let file = File::create(&layout.output)?;
  let encoder = GzEncoder::new(file, Compression::default());
  let mut builder = tar::Builder::new(encoder);

  builder.append_path_with_name(&layout.source, &layout.entry_path)?;

  let file = builder.into_inner()?.finish()?;
  file.sync_all()
}

fn digest_file(path: &Path) -> RelupResult<(u64, String)> {
  let mut file = File::open(path).with_context(|| format!("Failed to reopen {}", path.display()))?;
  let mut hasher = Sha256::new();
  let size = io::copy(&mut file, &mut hasher)?;
  Ok((size, format!("{:x}", hasher.finalize())))
}
