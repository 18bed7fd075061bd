//! Canonical project directory tree

use crate::error::InitError;
use std::fs;
use std::path::Path;

pub const API_DEFINITIONS_DIR: &str = "api_definitions";
pub const INTERCEPTORS_DIR: &str = "interceptors";
pub const EXTENSIONS_DIR: &str = "extensions";
pub const SERVICES_DIR: &str = "services";
pub const LIB_DIR: &str = "lib";
pub const CONF_DIR: &str = "conf";
pub const GEN_DIR: &str = "target/gen";

/// Directories every project starts with, relative to the project root
pub const PROJECT_DIRS: &[&str] = &[
    API_DEFINITIONS_DIR,
    INTERCEPTORS_DIR,
    EXTENSIONS_DIR,
    SERVICES_DIR,
    LIB_DIR,
    CONF_DIR,
    GEN_DIR,
];

pub fn create_project_structure(root: &Path) -> Result<(), InitError> {
    for dir in PROJECT_DIRS {
        let path = root.join(dir);
        fs::create_dir_all(&path).map_err(|source| InitError::Scaffold { path, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_all_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("petstore");

        create_project_structure(&root).unwrap();

        for sub in PROJECT_DIRS {
            assert!(root.join(sub).is_dir(), "missing {sub}");
        }
    }

    #[test]
    fn test_file_in_the_way_fails() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("petstore");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(CONF_DIR), b"not a dir").unwrap();

        let err = create_project_structure(&root).unwrap_err();
        assert!(matches!(err, InitError::Scaffold { .. }));
    }
}
