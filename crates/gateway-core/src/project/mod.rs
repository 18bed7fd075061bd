//! Project initialization workflow
//!
//! ```text
//! Validating -> Invalidating -> Staging(platform) -> Staging(runtime)
//!            -> ScaffoldingDirs -> WritingConfig -> Done
//! ```
//!
//! Any phase may fail; nothing is rolled back. Re-running with force is the
//! recovery path.

pub mod descriptor;
pub mod structure;

use crate::config::{DeploymentConfig, GatewayLayout};
use crate::error::{FingerprintError, InitError};
use crate::hashing::{HashTracker, LibraryFingerprint};
use crate::product::ProductConfig;
use crate::staging::{remove_tree, ArchiveStager, StageOutcome, TargetKind};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use descriptor::{validate_project_name, ProjectDescriptor};
pub use structure::{create_project_structure, PROJECT_DIRS};

/// Step of an initialization run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Validating,
    Invalidating,
    Staging(TargetKind),
    ScaffoldingDirs,
    WritingConfig,
    Done,
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitPhase::Validating => f.write_str("validating project"),
            InitPhase::Invalidating => f.write_str("checking library changes"),
            InitPhase::Staging(kind) => write!(f, "staging {kind}"),
            InitPhase::ScaffoldingDirs => f.write_str("creating project structure"),
            InitPhase::WritingConfig => f.write_str("writing deployment configuration"),
            InitPhase::Done => f.write_str("done"),
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub project_name: String,
    pub project_root: PathBuf,
    pub cache_invalidated: bool,
    pub platform: StageOutcome,
    pub runtime: StageOutcome,
}

impl InitReport {
    pub fn success_message(&self) -> String {
        format!("Project '{}' is initialized successfully.", self.project_name)
    }
}

/// Creates projects and keeps the staged platform and runtime current
pub struct Initializer<C: ProductConfig> {
    config: C,
    layout: GatewayLayout,
    tracker: HashTracker,
    stager: ArchiveStager,
}

impl<C: ProductConfig> Initializer<C> {
    pub fn new(config: &C, layout: GatewayLayout) -> Self {
        Self {
            config: config.clone(),
            tracker: HashTracker::new(&layout),
            stager: ArchiveStager::new(&layout),
            layout,
        }
    }

    pub fn layout(&self) -> &GatewayLayout {
        &self.layout
    }

    pub fn initialize(&self, descriptor: &ProjectDescriptor) -> Result<InitReport, InitError> {
        self.initialize_with_progress(descriptor, |_| {})
    }

    /// Run all phases, reporting each one to `on_phase` before it starts
    pub fn initialize_with_progress(
        &self,
        descriptor: &ProjectDescriptor,
        mut on_phase: impl FnMut(InitPhase),
    ) -> Result<InitReport, InitError> {
        let result = self.run(descriptor, &mut on_phase);
        match &result {
            Ok(_) => on_phase(InitPhase::Done),
            Err(e) => debug!(phase = %e.phase(), error = %e, "initialization failed"),
        }
        result
    }

    fn run(
        &self,
        descriptor: &ProjectDescriptor,
        on_phase: &mut impl FnMut(InitPhase),
    ) -> Result<InitReport, InitError> {
        let root = descriptor.root_path();

        on_phase(InitPhase::Validating);
        if root.exists() {
            if !descriptor.is_forced() {
                return Err(InitError::AlreadyExists {
                    name: descriptor.name().to_string(),
                    path: root.to_path_buf(),
                });
            }
            info!(project = descriptor.name(), "removing existing project");
            remove_tree(root).map_err(|source| InitError::RemoveExisting {
                path: root.to_path_buf(),
                source,
            })?;
        }

        on_phase(InitPhase::Invalidating);
        let (cache_invalidated, fingerprint) = self.invalidate_stale_targets()?;

        let mut outcomes = Vec::with_capacity(TargetKind::ALL.len());
        for target in self.layout.targets() {
            let phase = InitPhase::Staging(target.kind());
            on_phase(phase);
            let outcome = self
                .stager
                .stage(&target)
                .map_err(|source| InitError::Staging { phase, source })?;
            info!(kind = %target.kind(), ?outcome, "target ready");
            outcomes.push(outcome);
        }

        if let Some(fingerprint) = fingerprint {
            if let Err(e) = self.tracker.record(&fingerprint) {
                warn!(error = %e, "failed to record library fingerprint");
            }
        }

        on_phase(InitPhase::ScaffoldingDirs);
        create_project_structure(root)?;

        on_phase(InitPhase::WritingConfig);
        let target = root
            .join(structure::CONF_DIR)
            .join(self.config.deployment_config_file());
        self.deployment_config(descriptor)
            .write(descriptor.deployment_config_path(), &target)?;

        Ok(InitReport {
            project_name: descriptor.name().to_string(),
            project_root: root.to_path_buf(),
            cache_invalidated,
            platform: outcomes[0],
            runtime: outcomes[1],
        })
    }

    /// Remove both targets when the tracked libraries changed.
    ///
    /// Returns whether targets were invalidated and the fingerprint to record
    /// after staging. Fingerprinting problems are logged and treated as
    /// "unchanged" so initialization can continue; a target that cannot be
    /// removed aborts the run.
    fn invalidate_stale_targets(
        &self,
    ) -> Result<(bool, Option<LibraryFingerprint>), InitError> {
        let (changed, fingerprint) = match self.tracker.compare() {
            Ok(result) => result,
            Err(e) => {
                log_fingerprint_error(&e);
                return Ok((false, None));
            }
        };

        if !changed {
            return Ok((false, Some(fingerprint)));
        }

        info!("gateway libraries changed, discarding staged targets");
        for target in self.layout.targets() {
            self.stager
                .discard(&target)
                .map_err(|source| InitError::Invalidate {
                    kind: target.kind(),
                    path: target.destination().to_path_buf(),
                    source,
                })?;
        }
        Ok((true, Some(fingerprint)))
    }

    fn deployment_config(&self, descriptor: &ProjectDescriptor) -> DeploymentConfig {
        self.config.default_deployment_config(descriptor.name())
    }
}

fn log_fingerprint_error(e: &FingerprintError) {
    warn!(error = %e, "error while detecting changes in gateway libraries, keeping staged targets");
}
