use crate::core::error::{ConfigError, RelupError, RelupResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OWNER: &str = "mozilla";
pub const DEFAULT_PLATFORM: &str = "linux-x86_64";
pub const DEFAULT_BUILD_DIR: &str = "target/release";

pub const ENV_PROJECT_NAME: &str = "PROJECT_NAME";
pub const ENV_PROXY_URL: &str = "TASKCLUSTER_PROXY_URL";
pub const ENV_API_URL: &str = "GITHUB_API_URL";

/// On-disk configuration (relup.toml)
/// Searched in order: relup.toml, .relup.toml, .config/relup.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
  #[serde(default)]
  pub release: FileReleaseSection,
}

/// `[release]` table. Every key is optional; unset keys fall through to
/// environment variables and then to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileReleaseSection {
  #[serde(default)]
  pub project: Option<String>,
  #[serde(default)]
  pub owner: Option<String>,
  #[serde(default)]
  pub platform: Option<String>,
  #[serde(default)]
  pub build_dir: Option<PathBuf>,
  #[serde(default)]
  pub output_dir: Option<PathBuf>,
  #[serde(default)]
  pub api_url: Option<String>,
}

impl FileConfig {
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("relup.toml"),
      path.join(".relup.toml"),
      path.join(".config").join("relup.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load the config file if one exists. A missing file is not an error.
  pub fn load(path: &Path) -> RelupResult<Option<(PathBuf, Self)>> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(None);
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: FileConfig = toml_edit::de::from_str(&content).map_err(|e| {
      RelupError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    Ok(Some((config_path, config)))
  }
}

/// Values supplied on the command line. These win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub project: Option<String>,
  pub owner: Option<String>,
  pub platform: Option<String>,
  pub build_dir: Option<PathBuf>,
  pub output_dir: Option<PathBuf>,
}

/// Fully resolved release configuration
///
/// Precedence per field: CLI flag, environment variable, relup.toml, default.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseConfig {
  /// Project, binary and repository name
  pub project: String,
  /// Repository owner on GitHub
  pub owner: String,
  /// Platform suffix appended to the archive name
  pub platform: String,
  /// Directory holding the compiled binary
  pub build_dir: PathBuf,
  /// Directory the archive is written to
  pub output_dir: PathBuf,
  /// GitHub REST API base URL
  pub api_url: String,
  /// Secret proxy base URL. Only `publish` needs it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub proxy_url: Option<String>,
  /// Config file the values were read from, if any
  #[serde(skip_serializing_if = "Option::is_none")]
  pub config_file: Option<PathBuf>,
}

impl ReleaseConfig {
  /// Resolve configuration from the process environment
  pub fn load(root: &Path, overrides: &Overrides) -> RelupResult<Self> {
    Self::resolve(root, overrides, |key| std::env::var(key).ok())
  }

  /// Resolve configuration with an injectable environment lookup
  pub fn resolve<F>(root: &Path, overrides: &Overrides, env: F) -> RelupResult<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let (config_file, file) = match FileConfig::load(root)? {
      Some((path, config)) => (Some(path), config.release),
      None => (None, FileReleaseSection::default()),
    };

    let project = overrides
      .project
      .clone()
      .or_else(|| env(ENV_PROJECT_NAME))
      .or(file.project)
      .ok_or_else(|| {
        RelupError::Config(ConfigError::MissingEnv {
          var: ENV_PROJECT_NAME.to_string(),
        })
      })?;
    validate_project_name(&project)?;

    let owner = overrides
      .owner
      .clone()
      .or(file.owner)
      .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let platform = overrides
      .platform
      .clone()
      .or(file.platform)
      .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

    let build_dir = overrides
      .build_dir
      .clone()
      .or(file.build_dir)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIR));

    let output_dir = overrides.output_dir.clone().or(file.output_dir).unwrap_or_default();

    let api_url = env(ENV_API_URL)
      .or(file.api_url)
      .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    Ok(Self {
      project,
      owner,
      platform,
      build_dir: root.join(build_dir),
      output_dir: root.join(output_dir),
      api_url: trim_base_url(&api_url),
      proxy_url: env(ENV_PROXY_URL).map(|url| trim_base_url(&url)),
      config_file,
    })
  }

  /// Secret proxy URL or a missing-variable error
  pub fn require_proxy_url(&self) -> RelupResult<&str> {
    self.proxy_url.as_deref().ok_or_else(|| {
      RelupError::Config(ConfigError::MissingEnv {
        var: ENV_PROXY_URL.to_string(),
      })
    })
  }

  /// `owner/project`
  pub fn repo_slug(&self) -> String {
    format!("{}/{}", self.owner, self.project)
  }
}

#[cfg(test)]
impl ReleaseConfig {
  /// Defaults rooted at `root`, for tests that build the struct directly
  pub(crate) fn for_project(root: &Path, project: &str) -> Self {
    Self {
      project: project.to_string(),
      owner: DEFAULT_OWNER.to_string(),
      platform: DEFAULT_PLATFORM.to_string(),
      build_dir: root.join(DEFAULT_BUILD_DIR),
      output_dir: root.to_path_buf(),
      api_url: DEFAULT_API_URL.to_string(),
      proxy_url: None,
      config_file: None,
    }
  }
}

fn validate_project_name(name: &str) -> RelupResult<()> {
  let reason = if name.trim().is_empty() {
    Some("name is empty")
  } else if name == "." || name == ".." {
    Some("name is a relative path component")
  } else if name.contains(['/', '\\']) {
    Some("name contains a path separator")
  } else {
    None
  };

  match reason {
    Some(reason) => Err(RelupError::Config(ConfigError::InvalidProject {
      name: name.to_string(),
      reason: reason.to_string(),
    })),
    None => Ok(()),
  }
}

fn trim_base_url(url: &str) -> String {
  url.trim().trim_end_matches('/').to_string()
}
