//! Product configuration trait for CLI binaries
//!
//! Each gateway distribution implements this trait to configure how projects
//! are initialized and how the tool home is located.

use crate::config::DeploymentConfig;
use std::path::Path;

/// Configuration trait for different gateway distributions
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Where the tool home is found
/// - The built-in deployment configuration
/// - Post-init instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Environment variable name for overriding the tool home
    fn home_env(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// File name of the deployment config inside the project `conf` directory
    fn deployment_config_file(&self) -> &'static str {
        "deployment-config.yaml"
    }

    /// Deployment config written when the user supplies no template
    fn default_deployment_config(&self, project_name: &str) -> DeploymentConfig {
        let mut config = DeploymentConfig::default();
        config.docker.image = project_name.to_string();
        config
    }

    /// Generate the "next steps" instructions after project initialization
    fn next_steps(&self, project_dir: &Path) -> Vec<String>;
}
