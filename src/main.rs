mod commands;
mod core;
mod release;
mod ui;

use clap::{ArgAction, Parser, Subcommand};
use crate::core::config::Overrides;
use crate::core::context::ReleaseContext;
use crate::core::error::{RelupError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Package a release binary and attach it to the latest GitHub release
#[derive(Parser)]
#[command(name = "relup")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Project, binary and repository name [env: PROJECT_NAME]
  #[arg(long, global = true)]
  project: Option<String>,

  /// GitHub repository owner (default: mozilla)
  #[arg(long, global = true)]
  owner: Option<String>,

  /// Platform suffix of the archive name (default: linux-x86_64)
  #[arg(long, global = true)]
  platform: Option<String>,

  /// Directory holding the compiled binary (default: target/release)
  #[arg(long, global = true)]
  build_dir: Option<PathBuf>,

  /// Directory the archive is written to (default: current directory)
  #[arg(long, global = true)]
  output_dir: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// Package the binary and upload it to the latest release
  Publish {
    /// Resolve the release but skip the upload
    #[arg(long)]
    dry_run: bool,
    /// Output the report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Build the release archive only (no network access)
  Package {
    /// Output the archive details in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Show the resolved configuration
  Config {
    /// Output configuration in JSON format
    #[arg(long)]
    json: bool,
  },
}

impl Cli {
  fn overrides(&self) -> Overrides {
    Overrides {
      project: self.project.clone(),
      owner: self.owner.clone(),
      platform: self.platform.clone(),
      build_dir: self.build_dir.clone(),
      output_dir: self.output_dir.clone(),
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  use anstyle::{AnsiColor, Style};

  let color = |c: AnsiColor| Style::new().fg_color(Some(c.into()));
  clap::builder::Styles::styled()
    .header(color(AnsiColor::Cyan).bold())
    .usage(color(AnsiColor::Cyan).bold())
    .literal(color(AnsiColor::Green))
    .placeholder(color(AnsiColor::BrightBlack))
    .error(color(AnsiColor::Red).bold())
}

/// Logs go to stderr so stdout stays clean for --json
fn init_tracing(verbose: u8) {
  let filter = match verbose {
    0 => EnvFilter::try_from_env("RELUP_LOG").unwrap_or_else(|_| EnvFilter::new("relup=info")),
    1 => EnvFilter::new("relup=debug"),
    _ => EnvFilter::new("relup=trace"),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match ReleaseContext::build(&root, &cli.overrides()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Publish { dry_run, json } => commands::run_publish(&ctx, dry_run, json),
    Commands::Package { json } => commands::run_package(&ctx, json),
    Commands::Config { json } => commands::run_config(&ctx, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RelupError) -> ! {
  tracing::debug!(error = ?err, "command failed");
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
