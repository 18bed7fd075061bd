//! Charm-style CLI output around the initializer

use crate::config::GatewayLayout;
use crate::product::ProductConfig;
use crate::project::{InitPhase, InitReport, Initializer, ProjectDescriptor};
use crate::staging::StageOutcome;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Project name, already validated as a single path component
    pub project_name: String,

    /// Delete and recreate an existing project
    pub force: bool,

    /// Deployment config template to seed the project with
    pub deployment_config: Option<PathBuf>,

    /// Directory the project is created in (defaults to the current directory)
    pub workspace: Option<PathBuf>,

    /// Tool home override
    pub home: Option<PathBuf>,
}

/// Initialize a project, reporting progress on the terminal
pub fn run<C: ProductConfig>(config: &C, args: InitArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    let layout = GatewayLayout::resolve(config, args.home.clone())?;
    cliclack::log::info(format!("Using home {}", layout.home().display()))?;

    let workspace = match &args.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let descriptor = ProjectDescriptor::new(args.project_name.as_str(), &workspace)
        .force_overwrite(args.force)
        .deployment_config(args.deployment_config.clone());

    let initializer = Initializer::new(config, layout);

    let spinner = cliclack::spinner();
    spinner.start("Initializing project...");
    let result = initializer.initialize_with_progress(&descriptor, |phase| {
        if phase != InitPhase::Done {
            spinner.set_message(format!("{}...", capitalize(&phase.to_string())));
        }
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            // The outro carries the message; callers should not print it again
            spinner.error("Initialization failed");
            cliclack::outro_cancel(e.to_string())?;
            return Err(e.into());
        }
    };
    spinner.stop(format!(
        "Created {} in {}",
        report.project_name,
        report.project_root.display()
    ));

    log_staging(&report)?;
    print_next_steps(config, &report.project_root)?;
    cliclack::outro(report.success_message())?;

    Ok(())
}

fn log_staging(report: &InitReport) -> Result<()> {
    if report.cache_invalidated {
        cliclack::log::info("Gateway libraries changed, refreshed staged platform and runtime")?;
    }
    for (name, outcome) in [("platform", report.platform), ("runtime", report.runtime)] {
        let line = match outcome {
            StageOutcome::Staged => format!("Extracted {}", name),
            StageOutcome::Restaged => format!("Re-extracted incomplete {}", name),
            StageOutcome::Skipped => continue,
        };
        cliclack::log::success(line)?;
    }
    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, project_dir: &Path) -> Result<()> {
    let steps = config.next_steps(project_dir);
    if steps.is_empty() {
        return Ok(());
    }

    println!();
    println!("  {}", "Next steps".bold());
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step.cyan());
    }
    println!();

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
