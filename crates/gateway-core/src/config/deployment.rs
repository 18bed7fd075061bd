//! Deployment configuration file written into new projects

use crate::error::ConfigWriteError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Docker image build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub enabled: bool,
    pub registry: String,
    pub image: String,
    pub tag: String,
    pub base_image: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            registry: String::new(),
            image: String::new(),
            tag: "latest".to_string(),
            base_image: "gateway-runtime:latest".to_string(),
        }
    }
}

/// Kubernetes artifact settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    pub enabled: bool,
    pub namespace: String,
    pub replicas: u32,
    pub service_type: String,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: "default".to_string(),
            replicas: 1,
            service_type: "ClusterIP".to_string(),
        }
    }
}

/// Contents of `conf/deployment-config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub docker: DockerConfig,
    pub kubernetes: KubernetesConfig,
}

impl DeploymentConfig {
    /// Write the deployment config to `target`.
    ///
    /// With a template the file is validated and copied as-is so user
    /// comments survive; otherwise `self` is serialized.
    pub fn write(&self, template: Option<&Path>, target: &Path) -> Result<(), ConfigWriteError> {
        let content = match template {
            Some(path) => {
                let content =
                    fs::read_to_string(path).map_err(|source| ConfigWriteError::ReadTemplate {
                        path: path.to_path_buf(),
                        source,
                    })?;
                serde_yaml::from_str::<DeploymentConfig>(&content).map_err(|source| {
                    ConfigWriteError::InvalidTemplate {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                content
            }
            None => serde_yaml::to_string(self).map_err(ConfigWriteError::Serialize)?,
        };

        fs::write(target, content).map_err(|source| ConfigWriteError::Write {
            path: target.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("deployment-config.yaml");

        DeploymentConfig::default().write(None, &target).unwrap();

        let written: DeploymentConfig =
            serde_yaml::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written, DeploymentConfig::default());
    }

    #[test]
    fn test_template_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("custom.yaml");
        let target = dir.path().join("deployment-config.yaml");
        let content = "# team registry\ndocker:\n  enabled: true\n  image: petstore\n";
        fs::write(&template, content).unwrap();

        DeploymentConfig::default()
            .write(Some(&template), &target)
            .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), content);
    }

    #[test]
    fn test_invalid_template_rejected() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("broken.yaml");
        let target = dir.path().join("deployment-config.yaml");
        fs::write(&template, "kubernetes:\n  replicas: many\n").unwrap();

        let err = DeploymentConfig::default()
            .write(Some(&template), &target)
            .unwrap_err();

        assert!(matches!(err, ConfigWriteError::InvalidTemplate { .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_missing_template_rejected() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("deployment-config.yaml");

        let err = DeploymentConfig::default()
            .write(Some(&dir.path().join("nope.yaml")), &target)
            .unwrap_err();

        assert!(matches!(err, ConfigWriteError::ReadTemplate { .. }));
    }
}
