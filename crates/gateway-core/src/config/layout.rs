//! On-disk layout of the gateway tool home
//!
//! ```text
//! <home>/
//!   lib/
//!     gateway/balo/        library repository fragments (tracked)
//!     gateway/platform/    gateway platform jars (tracked)
//!     platform.zip         platform bundle
//!     platform/            extracted platform target
//!     runtime.zip          runtime bundle
//!     runtime/             extracted runtime target
//!   .state/
//!     lib-fingerprint.yaml
//! ```

use crate::product::ProductConfig;
use crate::staging::{ExtractionTarget, Overlay, TargetKind};
use std::path::{Path, PathBuf};

const LIB_DIR: &str = "lib";
const GATEWAY_DIR: &str = "gateway";
const BALO_DIR: &str = "balo";
const PLATFORM_JARS_DIR: &str = "platform";
const STATE_DIR: &str = ".state";
const FINGERPRINT_FILE: &str = "lib-fingerprint.yaml";

/// Library repository subpath inside a staged target
const TARGET_REPO_DIR: &str = "lib/repo";
/// Runtime library subpath inside a staged target
const TARGET_RUNTIME_LIB_DIR: &str = "bre/lib";

/// Paths shared by the hash tracker, the archive stager and the initializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayLayout {
    home: PathBuf,
}

impl GatewayLayout {
    /// Layout rooted at an explicit tool home
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the tool home from an explicit override, the product's
    /// environment variable, or the installation directory of the executable
    pub fn resolve<C: ProductConfig>(config: &C, home_override: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(home) = home_override {
            return Ok(Self::new(home));
        }

        if let Some(home) = std::env::var_os(config.home_env()).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(home)));
        }

        // <home>/bin/<executable>
        let exe = std::env::current_exe()?;
        let home = exe
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Cannot determine {} home from {}; set {}",
                    config.display_name(),
                    exe.display(),
                    config.home_env()
                )
            })?;
        Ok(Self::new(home))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Shared library root holding the archives, targets and overlay sources
    pub fn lib_root(&self) -> PathBuf {
        self.home.join(LIB_DIR)
    }

    /// Directory whose contents decide whether staged targets are stale
    pub fn tracked_dir(&self) -> PathBuf {
        self.lib_root().join(GATEWAY_DIR)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.home.join(STATE_DIR)
    }

    pub fn fingerprint_file(&self) -> PathBuf {
        self.state_dir().join(FINGERPRINT_FILE)
    }

    pub fn target(&self, kind: TargetKind) -> ExtractionTarget {
        ExtractionTarget::new(kind, self.lib_root().join(kind.dir_name()))
    }

    pub fn targets(&self) -> [ExtractionTarget; 2] {
        TargetKind::ALL.map(|kind| self.target(kind))
    }

    /// Overlays applied to every target, in order
    pub fn overlays(&self) -> Vec<Overlay> {
        vec![
            Overlay::new(format!("{GATEWAY_DIR}/{BALO_DIR}"), TARGET_REPO_DIR),
            Overlay::new(
                format!("{GATEWAY_DIR}/{PLATFORM_JARS_DIR}"),
                TARGET_RUNTIME_LIB_DIR,
            ),
        ]
    }
}
