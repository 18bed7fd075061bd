//! Inputs of a single initialization run

use std::path::{Path, PathBuf};

/// What to initialize and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    name: String,
    root_path: PathBuf,
    force_overwrite: bool,
    deployment_config_path: Option<PathBuf>,
}

impl ProjectDescriptor {
    /// Project `name` created directly under `workspace`
    pub fn new(name: impl Into<String>, workspace: &Path) -> Self {
        let name = name.into();
        let root_path = workspace.join(&name);
        Self {
            name,
            root_path,
            force_overwrite: false,
            deployment_config_path: None,
        }
    }

    pub fn force_overwrite(mut self, force: bool) -> Self {
        self.force_overwrite = force;
        self
    }

    pub fn deployment_config(mut self, path: Option<PathBuf>) -> Self {
        self.deployment_config_path = path;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn is_forced(&self) -> bool {
        self.force_overwrite
    }

    pub fn deployment_config_path(&self) -> Option<&Path> {
        self.deployment_config_path.as_deref()
    }
}

/// Check that a project name is a single path component
pub fn validate_project_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("project name must not be empty".to_string());
    }
    if trimmed == "." || trimmed == ".." {
        return Err(format!("'{trimmed}' is not a valid project name"));
    }
    if trimmed.contains(['/', '\\']) || trimmed.chars().any(char::is_whitespace) {
        return Err(format!(
            "project name '{trimmed}' must be a single token without path separators"
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_workspace_join_name() {
        let descriptor = ProjectDescriptor::new("petstore", Path::new("/work"));
        assert_eq!(descriptor.root_path(), Path::new("/work/petstore"));
        assert!(!descriptor.is_forced());
        assert!(descriptor.deployment_config_path().is_none());
    }

    #[test]
    fn test_builder_flags() {
        let descriptor = ProjectDescriptor::new("petstore", Path::new("/work"))
            .force_overwrite(true)
            .deployment_config(Some(PathBuf::from("/tmp/deploy.yaml")));
        assert!(descriptor.is_forced());
        assert_eq!(
            descriptor.deployment_config_path(),
            Some(Path::new("/tmp/deploy.yaml"))
        );
    }

    #[test]
    fn test_validate_project_name() {
        assert_eq!(validate_project_name(" petstore ").unwrap(), "petstore");
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("..").is_err());
        assert!(validate_project_name("a/b").is_err());
        assert!(validate_project_name("pet store").is_err());
    }
}
