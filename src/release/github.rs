//! GitHub REST client: repository lookup, latest release, asset upload

use crate::core::error::{GithubError, RelupError, RelupResult, ResultExt};
use crate::release::archive::PackagedArchive;
use crate::release::secret::DeployToken;
use crate::ui::progress::{ProgressReader, TransferProgress};
use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;

pub const OCTET_STREAM: &str = "application/octet-stream";

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
  pub id: u64,
  pub full_name: String,
  #[serde(default)]
  pub html_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
  pub id: u64,
  pub tag_name: String,
  #[serde(default)]
  pub name: Option<String>,
  /// RFC 6570 template, e.g. `https://uploads.github.com/repos/o/r/releases/1/assets{?name,label}`
  pub upload_url: String,
  #[serde(default)]
  pub html_url: Option<String>,
  #[serde(default)]
  pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub size: u64,
  #[serde(default)]
  pub content_type: Option<String>,
  #[serde(default)]
  pub browser_download_url: Option<String>,
}

#[derive(Deserialize)]
struct ApiMessage {
  message: String,
}

/// Authenticated GitHub API client
pub struct GithubClient {
  http: Client,
  api_url: String,
  token: DeployToken,
}

impl GithubClient {
  pub fn new(api_url: &str, token: DeployToken) -> RelupResult<Self> {
    Ok(Self {
      http: super::http_client()?,
      api_url: api_url.trim_end_matches('/').to_string(),
      token,
    })
  }

  fn request(&self, method: Method, url: &str) -> RequestBuilder {
    self
      .http
      .request(method, url)
      .bearer_auth(self.token.expose())
      .header(ACCEPT, GITHUB_JSON)
      .header(API_VERSION_HEADER, API_VERSION)
  }

  /// `GET /repos/{owner}/{name}`
  pub fn repository(&self, owner: &str, name: &str) -> RelupResult<Repository> {
    let endpoint = format!("/repos/{}/{}", owner, name);
    let response = self.request(Method::GET, &self.url(&endpoint)).send()?;

    match response.status() {
      status if status.is_success() => Ok(response.json()?),
      StatusCode::NOT_FOUND => Err(
        GithubError::RepoNotFound {
          repo: format!("{}/{}", owner, name),
        }
        .into(),
      ),
      _ => Err(api_failure(&endpoint, response).into()),
    }
  }

  /// `GET /repos/{full_name}/releases/latest`
  ///
  /// GitHub answers 404 when the repository has no published release.
  pub fn latest_release(&self, repo: &Repository) -> RelupResult<Release> {
    let endpoint = format!("/repos/{}/releases/latest", repo.full_name);
    let response = self.request(Method::GET, &self.url(&endpoint)).send()?;

    match response.status() {
      status if status.is_success() => Ok(response.json()?),
      StatusCode::NOT_FOUND => Err(
        GithubError::NoRelease {
          repo: repo.full_name.clone(),
        }
        .into(),
      ),
      _ => Err(api_failure(&endpoint, response).into()),
    }
  }

  /// Upload `archive` as an asset of `release`
  ///
  /// The body is streamed from disk with an explicit length; `show_progress`
  /// draws a transfer bar on stderr.
  pub fn upload_asset(
    &self,
    release: &Release,
    archive: &PackagedArchive,
    content_type: &str,
    show_progress: bool,
  ) -> RelupResult<ReleaseAsset> {
    let url = upload_endpoint(&release.upload_url, &archive.file_name)?;
    let file = File::open(&archive.path).with_context(|| format!("Failed to open {}", archive.path.display()))?;

    let reader: Box<dyn Read + Send> = if show_progress {
      let mut bar = TransferProgress::new(archive.size, format!("Uploading {}", archive.file_name));
      Box::new(ProgressReader::new(file, move |n| bar.inc_by(n)))
    } else {
      Box::new(file)
    };

    tracing::debug!(%url, size = archive.size, "uploading asset");
    let response = self
      .request(Method::POST, url.as_str())
      .header(CONTENT_TYPE, content_type)
      .body(Body::sized(reader, archive.size))
      .send()?;

    let status = response.status();
    if status.is_success() {
      return Ok(response.json()?);
    }
    if status == StatusCode::UNAUTHORIZED {
      return Err(api_failure(url.path(), response).into());
    }

    Err(
      GithubError::UploadRejected {
        asset: archive.file_name.clone(),
        status: status.as_u16(),
        message: error_message(response),
      }
      .into(),
    )
  }

  fn url(&self, endpoint: &str) -> String {
    format!("{}{}", self.api_url, endpoint)
  }
}

/// Strip the `{?name,label}` template from `upload_url` and add `name=<file>`
pub fn upload_endpoint(upload_url: &str, file_name: &str) -> RelupResult<Url> {
  let base = upload_url.split('{').next().unwrap_or(upload_url);
  let mut url = Url::parse(base).map_err(|e| {
    RelupError::with_help(
      format!("Invalid upload_url '{}' in release: {}", upload_url, e),
      "Check that GITHUB_API_URL points at a GitHub REST API.",
    )
  })?;
  url.query_pairs_mut().append_pair("name", file_name);
  Ok(url)
}

fn api_failure(endpoint: &str, response: Response) -> GithubError {
  let status = response.status();
  let message = error_message(response);
  if status == StatusCode::UNAUTHORIZED {
    GithubError::Unauthorized { message }
  } else {
    GithubError::Api {
      endpoint: endpoint.to_string(),
      status: status.as_u16(),
      message,
    }
  }
}

/// GitHub's `message` field if present, else the raw body or status reason
fn error_message(response: Response) -> String {
  let status = response.status();
  let body = response.text().unwrap_or_default();

  if let Ok(api) = serde_json::from_str::<ApiMessage>(&body) {
    return api.message;
  }
  let body = body.trim();
  if body.is_empty() {
    status.canonical_reason().unwrap_or("unknown error").to_string()
  } else {
    body.chars().take(200).collect()
  }
}
