//! Gateway CLI - Project initialization for gateway projects

use anyhow::Result;
use clap::{Parser, Subcommand};
use gateway_core::project::validate_project_name;
use gateway_core::tui::InitArgs;
use gateway_core::{InitError, ProductConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Gateway product configuration
#[derive(Clone)]
pub struct GatewayConfig;

impl ProductConfig for GatewayConfig {
    fn name(&self) -> &'static str {
        "gateway"
    }

    fn display_name(&self) -> &'static str {
        "Gateway"
    }

    fn home_env(&self) -> &'static str {
        "GATEWAY_HOME"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for initializing gateway projects"
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != dir.parent() {
            steps.push(format!("cd {}", dir.display()));
        } else if let Some(name) = dir.file_name() {
            steps.push(format!("cd {}", name.to_string_lossy()));
        }

        steps.push("Add OpenAPI definitions to api_definitions/".to_string());
        steps.push("Review conf/deployment-config.yaml".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "gateway-tools")]
#[command(about = "CLI for initializing gateway projects")]
#[command(version)]
pub struct Args {
    /// Gateway tool home (defaults to $GATEWAY_HOME, then the installation directory)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new project
    Init(CliInitArgs),
}

#[derive(Parser, Debug)]
pub struct CliInitArgs {
    /// Name of the project directory to create
    #[arg(value_parser = validate_project_name)]
    pub project_name: String,

    /// Forcefully recreate the project if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Deployment config file to seed the project with
    #[arg(short, long = "deployment-config")]
    pub deployment_config: Option<PathBuf>,

    /// Directory to create the project in (defaults to the current directory)
    #[arg(long)]
    pub workspace: Option<PathBuf>,
}

impl CliInitArgs {
    fn into_init_args(self, home: Option<PathBuf>) -> InitArgs {
        InitArgs {
            project_name: self.project_name,
            force: self.force,
            deployment_config: self.deployment_config,
            workspace: self.workspace,
            home,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

/// Initialization errors have already been shown by the TUI outro
fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<InitError>().is_some()
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // An interrupted staging is redone on the next run; an interrupted project is not
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        eprintln!("\nInterrupted. Re-run with --force to recreate a partially initialized project.");
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);
    let config = GatewayConfig;

    let result = match args.command {
        Command::Init(init_args) => gateway_core::run(&config, init_args.into_init_args(args.home)),
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Err(e) if already_reported(&e) => std::process::exit(1),
        other => other,
    }
}
