//! Deploy token retrieval through the Taskcluster secrets proxy

use crate::core::config::ReleaseConfig;
use crate::core::error::{RelupResult, SecretError};
use reqwest::blocking::Client;
use serde_json::Value;
use std::fmt;

const SECRET_PREFIX: &str = "secrets/v1/secret/project/relman";
const TOKEN_POINTER: &str = "/github/token";

/// GitHub deploy token for one project
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct DeployToken(String);

impl DeployToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  /// The raw token, for the Authorization header
  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for DeployToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("DeployToken(***)")
  }
}

/// `<proxy>/secrets/v1/secret/project/relman/<project>/deploy`
pub fn secret_url(proxy_url: &str, project: &str) -> String {
  format!("{}/{}/{}/deploy", proxy_url.trim_end_matches('/'), SECRET_PREFIX, project)
}

/// Client for the secrets endpoint of the Taskcluster proxy
pub struct SecretClient {
  http: Client,
  proxy_url: String,
}

impl SecretClient {
  pub fn new(proxy_url: &str) -> RelupResult<Self> {
    Ok(Self {
      http: super::http_client()?,
      proxy_url: proxy_url.to_string(),
    })
  }

  /// Fetch the deploy token for `project`
  ///
  /// One GET, no retry. Any non-success status is fatal.
  pub fn fetch_deploy_token(&self, project: &str) -> RelupResult<DeployToken> {
    let url = secret_url(&self.proxy_url, project);
    tracing::debug!(%url, "requesting deploy secret");

    let response = self.http.get(&url).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(
        SecretError::Status {
          url,
          status: status.as_u16(),
        }
        .into(),
      );
    }

    let body = response.text()?;
    let token = parse_token(&body)?;
    tracing::info!(project, "deploy token retrieved");
    Ok(token)
  }
}

/// Fetch the deploy token for the configured project
pub fn fetch_deploy_token(config: &ReleaseConfig) -> RelupResult<DeployToken> {
  SecretClient::new(config.require_proxy_url()?)?.fetch_deploy_token(&config.project)
}

fn parse_token(body: &str) -> Result<DeployToken, SecretError> {
  let value: Value = serde_json::from_str(body).map_err(|e| SecretError::Malformed {
    reason: format!("response is not JSON ({})", e),
  })?;

  match value.pointer(TOKEN_POINTER) {
    Some(Value::String(token)) if !token.is_empty() => Ok(DeployToken::new(token.clone())),
    Some(Value::String(_)) => Err(SecretError::Malformed {
      reason: "github.token is empty".to_string(),
    }),
    Some(_) => Err(SecretError::Malformed {
      reason: "github.token is not a string".to_string(),
    }),
    None => Err(SecretError::Malformed {
      reason: "missing field github.token".to_string(),
    }),
  }
}
