//! Tool layout and project configuration files

pub mod deployment;
pub mod layout;

pub use deployment::{DeploymentConfig, DockerConfig, KubernetesConfig};
pub use layout::GatewayLayout;
