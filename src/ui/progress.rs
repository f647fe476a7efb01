//! Progress indicators for uploads
//!
//! Uses `linya` for allocation-free progress bars drawn on stderr

use linya::{Bar, Progress};
use std::io::{self, Read};

/// Progress bar over a byte count
pub struct TransferProgress {
  progress: Progress,
  bar: Bar,
}

impl TransferProgress {
  /// Create a new progress bar for `total` bytes
  pub fn new(total: u64, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(usize::try_from(total).unwrap_or(usize::MAX), label.into());
    Self { progress, bar }
  }

  /// Advance by `bytes`
  pub fn inc_by(&mut self, bytes: usize) {
    self.progress.inc_and_draw(&self.bar, bytes);
  }
}

/// Reader that reports each chunk it hands out
///
/// Pair with [`TransferProgress::inc_by`] to draw an upload bar.
pub struct ProgressReader<R, F> {
  inner: R,
  on_read: F,
}

impl<R: Read, F: FnMut(usize)> ProgressReader<R, F> {
  pub fn new(inner: R, on_read: F) -> Self {
    Self { inner, on_read }
  }
}

impl<R: Read, F: FnMut(usize)> Read for ProgressReader<R, F> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let n = self.inner.read(buf)?;
    if n > 0 {
      (self.on_read)(n);
    }
    Ok(n)
  }
}
