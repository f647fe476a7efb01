//! Error types for relup with contextual messages and exit codes
//!
//! Every failure in the pipeline is fatal. The error carries enough
//! context to tell the CI log reader which step broke and, where there is
//! an obvious fix, a help line pointing at it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for relup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, missing env vars, missing binary)
  User = 1,
  /// System error (I/O, network, HTTP status)
  System = 2,
  /// Validation failure (payload shape, missing release)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for relup
#[derive(Debug)]
pub enum RelupError {
  /// Configuration errors
  Config(ConfigError),

  /// Archive creation errors
  Archive(ArchiveError),

  /// Secret proxy errors
  Secret(SecretError),

  /// GitHub API errors
  Github(GithubError),

  /// Transport-level HTTP errors
  Http(reqwest::Error),

  /// I/O errors, optionally with the operation that failed
  Io { source: io::Error, context: Option<String> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RelupError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RelupError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RelupError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Typed errors keep their variant; context is only attached to I/O
  /// errors and generic messages.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RelupError::Message { message, context, help } => RelupError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RelupError::Io { source, context } => RelupError::Io {
        source,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RelupError::Config(_) => ExitCode::User,
      RelupError::Archive(_) => ExitCode::User,
      RelupError::Secret(SecretError::Status { .. }) => ExitCode::System,
      RelupError::Secret(_) => ExitCode::Validation,
      RelupError::Github(GithubError::NoRelease { .. }) => ExitCode::Validation,
      RelupError::Github(_) => ExitCode::System,
      RelupError::Http(_) => ExitCode::System,
      RelupError::Io { .. } => ExitCode::System,
      RelupError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RelupError::Config(e) => e.help_message(),
      RelupError::Archive(e) => e.help_message(),
      RelupError::Secret(e) => e.help_message(),
      RelupError::Github(e) => e.help_message(),
      RelupError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for RelupError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RelupError::Config(e) => write!(f, "{}", e),
      RelupError::Archive(e) => write!(f, "{}", e),
      RelupError::Secret(e) => write!(f, "{}", e),
      RelupError::Github(e) => write!(f, "{}", e),
      RelupError::Http(e) => write!(f, "HTTP request failed: {}", e),
      RelupError::Io { source, context } => {
        write!(f, "I/O error: {}", source)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
      RelupError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RelupError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RelupError::Io { source, .. } => Some(source),
      RelupError::Http(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RelupError {
  fn from(err: io::Error) -> Self {
    RelupError::Io {
      source: err,
      context: None,
    }
  }
}

impl From<reqwest::Error> for RelupError {
  fn from(err: reqwest::Error) -> Self {
    RelupError::Http(err)
  }
}

impl From<serde_json::Error> for RelupError {
  fn from(err: serde_json::Error) -> Self {
    RelupError::message(format!("JSON error: {}", err))
  }
}

impl From<ConfigError> for RelupError {
  fn from(err: ConfigError) -> Self {
    RelupError::Config(err)
  }
}

impl From<ArchiveError> for RelupError {
  fn from(err: ArchiveError) -> Self {
    RelupError::Archive(err)
  }
}

impl From<SecretError> for RelupError {
  fn from(err: SecretError) -> Self {
    RelupError::Secret(err)
  }
}

impl From<GithubError> for RelupError {
  fn from(err: GithubError) -> Self {
    RelupError::Github(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Required environment variable is unset or empty
  MissingEnv { var: String },

  /// Project name cannot name a binary
  InvalidProject { name: String, reason: String },

  /// Config file exists but could not be parsed
  Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingEnv { var } if var == "PROJECT_NAME" => {
        Some("Set PROJECT_NAME or pass --project <NAME>.".to_string())
      }
      ConfigError::MissingEnv { var } if var == "TASKCLUSTER_PROXY_URL" => Some(
        "TASKCLUSTER_PROXY_URL is provided by the Taskcluster proxy feature. Enable `taskclusterProxy` in the task definition."
          .to_string(),
      ),
      ConfigError::InvalidProject { .. } => {
        Some("The project name must match the binary name under target/release.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingEnv { var } => write!(f, "Missing required environment variable: {}", var),
      ConfigError::InvalidProject { name, reason } => write!(f, "Invalid project name '{}': {}", name, reason),
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Archive creation errors
#[derive(Debug)]
pub enum ArchiveError {
  /// The release binary does not exist
  SourceNotFound { path: PathBuf },

  /// The release binary path exists but is not a regular file
  SourceNotFile { path: PathBuf },
}

impl ArchiveError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArchiveError::SourceNotFound { .. } => Some("Build the binary first with `cargo build --release`.".to_string()),
      ArchiveError::SourceNotFile { .. } => None,
    }
  }
}

impl fmt::Display for ArchiveError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArchiveError::SourceNotFound { path } => write!(f, "Release binary not found: {}", path.display()),
      ArchiveError::SourceNotFile { path } => write!(f, "Release binary is not a file: {}", path.display()),
    }
  }
}

/// Secret proxy errors
#[derive(Debug)]
pub enum SecretError {
  /// Proxy answered with a non-success status
  Status { url: String, status: u16 },

  /// Payload did not carry a usable token
  Malformed { reason: String },
}

impl SecretError {
  fn help_message(&self) -> Option<String> {
    match self {
      SecretError::Status { status: 403, .. } | SecretError::Status { status: 401, .. } => Some(
        "The task is not allowed to read this secret. Check the task's scopes for secrets:get:project/relman/..."
          .to_string(),
      ),
      SecretError::Status { status: 404, .. } => {
        Some("No deploy secret exists for this project under project/relman/.".to_string())
      }
      SecretError::Malformed { .. } => {
        Some("The secret must be shaped as {\"github\": {\"token\": \"...\"}}.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for SecretError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SecretError::Status { url, status } => write!(f, "Secret proxy returned HTTP {} for {}", status, url),
      SecretError::Malformed { reason } => write!(f, "Malformed deploy secret: {}", reason),
    }
  }
}

/// GitHub API errors
#[derive(Debug)]
pub enum GithubError {
  /// Token rejected
  Unauthorized { message: String },

  /// Repository lookup failed
  RepoNotFound { repo: String },

  /// Repository has no published release
  NoRelease { repo: String },

  /// Asset upload rejected
  UploadRejected {
    asset: String,
    status: u16,
    message: String,
  },

  /// Any other non-success response
  Api {
    endpoint: String,
    status: u16,
    message: String,
  },
}

impl GithubError {
  fn help_message(&self) -> Option<String> {
    match self {
      GithubError::Unauthorized { .. } => {
        Some("The deploy token was rejected. Rotate the github.token field of the deploy secret.".to_string())
      }
      GithubError::RepoNotFound { repo } => Some(format!(
        "Check that {} exists and that the deploy token can see it.",
        repo
      )),
      GithubError::NoRelease { repo } => Some(format!(
        "Publish a release on {} before uploading assets (drafts and prereleases are not 'latest').",
        repo
      )),
      GithubError::UploadRejected { status: 422, asset, .. } => Some(format!(
        "An asset named '{}' probably already exists on this release. Delete it and re-run.",
        asset
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GithubError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GithubError::Unauthorized { message } => write!(f, "GitHub authentication failed: {}", message),
      GithubError::RepoNotFound { repo } => write!(f, "GitHub repository not found: {}", repo),
      GithubError::NoRelease { repo } => write!(f, "No published release found for {}", repo),
      GithubError::UploadRejected { asset, status, message } => {
        write!(f, "Upload of '{}' rejected (HTTP {}): {}", asset, status, message)
      }
      GithubError::Api {
        endpoint,
        status,
        message,
      } => write!(f, "GitHub API error on {} (HTTP {}): {}", endpoint, status, message),
    }
  }
}

/// Result type alias for relup
pub type RelupResult<T> = Result<T, RelupError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RelupResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RelupError>,
{
  fn with_context<F>(self, f: F) -> RelupResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RelupError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
