//! Tests for `relup config` and configuration errors

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_config_reads_environment() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_relup(
    &project.path,
    &["config", "--json"],
    &[
      ("PROJECT_NAME", "dump_syms"),
      ("TASKCLUSTER_PROXY_URL", "http://taskcluster/"),
    ],
  )?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["project"], "dump_syms");
  assert_eq!(json["owner"], "mozilla");
  assert_eq!(json["platform"], "linux-x86_64");
  assert_eq!(json["api_url"], "https://api.github.com");
  assert_eq!(json["proxy_url"], "http://taskcluster");

  Ok(())
}

#[test]
fn test_config_file_and_flag_precedence() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file(
    "relup.toml",
    r#"
[release]
project = "from-file"
owner = "someone"
"#,
  )?;

  let output = run_relup(&project.path, &["config", "--json", "--owner", "cli-owner"], &[])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["project"], "from-file");
  assert_eq!(json["owner"], "cli-owner");

  Ok(())
}

#[test]
fn test_missing_project_name() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_relup_raw(&project.path, &["config"], &[])?;

  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("PROJECT_NAME"), "stderr: {}", stderr);
  assert!(stderr.contains("--project"), "stderr: {}", stderr);

  Ok(())
}
