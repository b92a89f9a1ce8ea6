mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::print_error;

/// bs - contribute build-system applications into buildpack layers
#[derive(Parser)]
#[command(name = "bs")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the application and replace its sources with the built artifact
  Contribute {
    /// Application directory
    #[arg(long, env = "CNB_APP_DIR", default_value = ".")]
    application: PathBuf,

    /// Layers root directory
    #[arg(long, env = "CNB_LAYERS_DIR")]
    layers: PathBuf,

    /// Build-system dependency cache directory
    #[arg(long, env = "BP_BUILD_CACHE")]
    cache: PathBuf,

    /// Buildpack plan file, updated in place
    #[arg(long, default_value = "plan.toml")]
    plan: PathBuf,

    /// Build command (defaults to $BP_BUILD_COMMAND)
    #[arg(long)]
    command: Option<String>,

    /// Prefer executable jars when several artifacts match
    #[arg(long)]
    executable_jar: bool,

    /// Build arguments (defaults to $BP_BUILD_ARGUMENTS)
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Show the effective build configuration
  Config,
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(e) = run(cli) {
    print_error(&format!("{:#}", e));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Contribute {
      application,
      layers,
      cache,
      plan,
      command,
      executable_jar,
      args,
    } => cmd::cmd_contribute(cmd::ContributeOptions {
      application,
      layers,
      cache,
      plan,
      command,
      executable_jar,
      args,
    }),
    Commands::Config => {
      cmd::cmd_config();
      Ok(())
    }
  }
}
