//! Tests for `relup publish`

use crate::helpers::*;
use anyhow::Result;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const DEPLOY_PATH: &str = "/secrets/v1/secret/project/relman/foo/deploy";

fn mount_token(proxy: &Stub, token: &str) {
  proxy.mount(
    Mock::given(method("GET"))
      .and(path(DEPLOY_PATH))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"github": {"token": token}}))),
  );
}

fn mount_repo(github: &Stub) {
  github.mount(
    Mock::given(method("GET"))
      .and(path("/repos/mozilla/foo"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 1,
        "full_name": "mozilla/foo",
        "html_url": "https://github.com/mozilla/foo"
      }))),
  );
}

fn mount_release(github: &Stub) {
  github.mount(
    Mock::given(method("GET"))
      .and(path("/repos/mozilla/foo/releases/latest"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": 7,
        "tag_name": "v0.3.0",
        "html_url": "https://github.com/mozilla/foo/releases/tag/v0.3.0",
        "upload_url": format!("{}/repos/mozilla/foo/releases/7/assets{{?name,label}}", github.uri()),
        "assets": []
      }))),
  );
}

fn envs<'a>(proxy: &'a str, github: &'a str) -> [(&'static str, &'a str); 3] {
  [
    ("PROJECT_NAME", "foo"),
    ("TASKCLUSTER_PROXY_URL", proxy),
    ("GITHUB_API_URL", github),
  ]
}

#[test]
fn test_publish_end_to_end() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"\x7fELF foo release build")?;

  let proxy = Stub::start()?;
  let github = Stub::start()?;
  mount_token(&proxy, "abc123");
  mount_repo(&github);
  mount_release(&github);
  github.mount(
    Mock::given(method("POST"))
      .and(path("/repos/mozilla/foo/releases/7/assets"))
      .and(query_param("name", "foo-linux-x86_64.tar.gz"))
      .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
        "id": 4242,
        "name": "foo-linux-x86_64.tar.gz",
        "content_type": "application/octet-stream",
        "browser_download_url": "https://github.com/mozilla/foo/releases/download/v0.3.0/foo-linux-x86_64.tar.gz"
      })))
      .expect(1),
  );

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup(&project.path, &["publish"], &envs(&proxy_uri, &github_uri))?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Uploaded foo-linux-x86_64.tar.gz"), "stdout: {}", stdout);

  // Exactly one upload, carrying the archive's exact bytes
  let uploads = github.requests_with("POST");
  assert_eq!(uploads.len(), 1);
  let upload = &uploads[0];
  assert_eq!(upload.body, project.read_bytes("foo-linux-x86_64.tar.gz")?);
  assert_eq!(
    upload.headers.get("content-type").and_then(|v| v.to_str().ok()),
    Some("application/octet-stream")
  );

  // Every GitHub call used the fetched token
  for request in github.requests() {
    assert_eq!(
      request.headers.get("authorization").and_then(|v| v.to_str().ok()),
      Some("Bearer abc123")
    );
  }
  assert_eq!(proxy.requests().len(), 1);

  Ok(())
}

#[test]
fn test_publish_missing_binary_makes_no_network_calls() -> Result<()> {
  let project = TestProject::new()?;
  let proxy = Stub::start()?;
  let github = Stub::start()?;

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup_raw(&project.path, &["publish"], &envs(&proxy_uri, &github_uri))?;

  assert_eq!(output.status.code(), Some(1));
  assert!(proxy.requests().is_empty());
  assert!(github.requests().is_empty());

  Ok(())
}

#[test]
fn test_publish_secret_not_found() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"foo")?;

  let proxy = Stub::start()?;
  let github = Stub::start()?;
  proxy.mount(
    Mock::given(method("GET"))
      .and(path(DEPLOY_PATH))
      .respond_with(ResponseTemplate::new(404))
      .expect(1),
  );

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup_raw(&project.path, &["publish"], &envs(&proxy_uri, &github_uri))?;

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("HTTP 404"), "stderr: {}", stderr);
  assert!(github.requests().is_empty(), "no GitHub call after a failed secret fetch");

  Ok(())
}

#[test]
fn test_publish_malformed_secret() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"foo")?;

  let proxy = Stub::start()?;
  let github = Stub::start()?;
  proxy.mount(
    Mock::given(method("GET"))
      .and(path(DEPLOY_PATH))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"github": {}}))),
  );

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup_raw(&project.path, &["publish"], &envs(&proxy_uri, &github_uri))?;

  assert_eq!(output.status.code(), Some(3));
  assert!(github.requests().is_empty());

  Ok(())
}

#[test]
fn test_publish_no_release_fails_without_retry() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"foo")?;

  let proxy = Stub::start()?;
  let github = Stub::start()?;
  mount_token(&proxy, "abc123");
  mount_repo(&github);
  github.mount(
    Mock::given(method("GET"))
      .and(path("/repos/mozilla/foo/releases/latest"))
      .and(header("authorization", "Bearer abc123"))
      .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})))
      .expect(1),
  );

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup_raw(&project.path, &["publish"], &envs(&proxy_uri, &github_uri))?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No published release"), "stderr: {}", stderr);
  assert!(github.requests_with("POST").is_empty());

  Ok(())
}

#[test]
fn test_publish_requires_proxy_url() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"foo")?;

  let output = run_relup_raw(&project.path, &["publish"], &[("PROJECT_NAME", "foo")])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("TASKCLUSTER_PROXY_URL"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_publish_dry_run_json() -> Result<()> {
  let project = TestProject::new()?;
  project.write_binary("foo", b"foo")?;

  let proxy = Stub::start()?;
  let github = Stub::start()?;
  mount_token(&proxy, "abc123");
  mount_repo(&github);
  mount_release(&github);

  let (proxy_uri, github_uri) = (proxy.uri(), github.uri());
  let output = run_relup(
    &project.path,
    &["publish", "--dry-run", "--json"],
    &envs(&proxy_uri, &github_uri),
  )?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["dry_run"], true);
  assert_eq!(json["release_tag"], "v0.3.0");
  assert_eq!(json["repository"], "mozilla/foo");
  assert!(json.get("asset").is_none());
  assert!(github.requests_with("POST").is_empty());

  // The token never reaches the output
  assert!(!String::from_utf8_lossy(&output.stdout).contains("abc123"));
  assert!(!String::from_utf8_lossy(&output.stderr).contains("abc123"));

  Ok(())
}
