//! Archive staging for the platform and runtime targets
//!
//! Staging unpacks a bundled zip next to its destination and then overlays
//! library fragments from the shared library root. A destination only counts
//! as staged once the completion marker has been written as the last step, so
//! a run interrupted halfway is redone instead of trusted.

pub mod archive;
pub mod fs_ops;

use crate::config::GatewayLayout;
use crate::error::StagingError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use archive::unzip;
pub use fs_ops::{copy_tree, remove_tree};

/// File written into a destination once staging has fully completed
pub const STAGED_MARKER: &str = ".staged";

const ARCHIVE_EXTENSION: &str = "zip";

/// Which distribution a target holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Platform,
    Runtime,
}

impl TargetKind {
    /// Staging order
    pub const ALL: [TargetKind; 2] = [TargetKind::Platform, TargetKind::Runtime];

    /// Directory name of the target under the library root
    pub fn dir_name(self) -> &'static str {
        match self {
            TargetKind::Platform => "platform",
            TargetKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A destination directory and the archive it is extracted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTarget {
    kind: TargetKind,
    destination: PathBuf,
    archive: PathBuf,
}

impl ExtractionTarget {
    /// The archive is always the destination path with `.zip` appended
    pub fn new(kind: TargetKind, destination: impl Into<PathBuf>) -> Self {
        let destination = destination.into();
        let mut archive = destination.clone().into_os_string();
        archive.push(".");
        archive.push(ARCHIVE_EXTENSION);
        Self {
            kind,
            destination,
            archive: PathBuf::from(archive),
        }
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    fn marker(&self) -> PathBuf {
        self.destination.join(STAGED_MARKER)
    }
}

/// Directed copy of a library subtree into a target subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Relative to the shared library root
    source: PathBuf,
    /// Relative to the target destination
    dest: PathBuf,
}

impl Overlay {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn dest(&self) -> &Path {
        &self.dest
    }
}

/// Result of a [`ArchiveStager::stage`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Archive extracted and overlays applied into a fresh destination
    Staged,
    /// Destination was already fully staged; nothing was written
    Skipped,
    /// A partially staged destination was discarded and staged again
    Restaged,
}

impl StageOutcome {
    pub fn did_work(self) -> bool {
        !matches!(self, StageOutcome::Skipped)
    }
}

/// Extracts bundles into their targets and applies the shared overlays
#[derive(Debug, Clone)]
pub struct ArchiveStager {
    lib_root: PathBuf,
    overlays: Vec<Overlay>,
}

impl ArchiveStager {
    pub fn new(layout: &GatewayLayout) -> Self {
        Self::with_overlays(layout.lib_root(), layout.overlays())
    }

    pub fn with_overlays(lib_root: impl Into<PathBuf>, overlays: Vec<Overlay>) -> Self {
        Self {
            lib_root: lib_root.into(),
            overlays,
        }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    /// Whether the target carries the completion marker
    pub fn is_staged(&self, target: &ExtractionTarget) -> bool {
        target.marker().is_file()
    }

    /// Remove a target so the next [`Self::stage`] extracts it again.
    ///
    /// The completion marker goes first: if removing the rest fails, the
    /// leftover is unmarked and gets restaged rather than trusted.
    pub fn discard(&self, target: &ExtractionTarget) -> io::Result<()> {
        match fs::remove_file(target.marker()) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        remove_tree(target.destination())
    }

    /// Stage `target` unless it is already complete.
    ///
    /// A failure leaves the destination partially populated and unmarked;
    /// the next call discards it and starts over.
    pub fn stage(&self, target: &ExtractionTarget) -> Result<StageOutcome, StagingError> {
        let destination = target.destination();

        if self.is_staged(target) {
            debug!(kind = %target.kind(), "already staged, skipping");
            return Ok(StageOutcome::Skipped);
        }

        let outcome = if destination.exists() {
            warn!(
                kind = %target.kind(),
                path = %destination.display(),
                "found incomplete staging from an earlier run, restaging"
            );
            remove_tree(destination).map_err(|e| StagingError::io(destination, e))?;
            StageOutcome::Restaged
        } else {
            StageOutcome::Staged
        };

        info!(
            kind = %target.kind(),
            archive = %target.archive().display(),
            "extracting bundle"
        );
        unzip(target.archive(), destination, true)?;

        for overlay in &self.overlays {
            let source = self.lib_root.join(overlay.source());
            if !source.exists() {
                return Err(StagingError::OverlayMissing(source));
            }
            let dest = destination.join(overlay.dest());
            let copied = copy_tree(&source, &dest)?;
            debug!(
                kind = %target.kind(),
                source = %source.display(),
                dest = %dest.display(),
                files = copied,
                "applied overlay"
            );
        }

        let marker = target.marker();
        fs::write(&marker, target.kind().dir_name()).map_err(|e| StagingError::io(&marker, e))?;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::archive::tests::write_zip;
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        layout: GatewayLayout,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let layout = GatewayLayout::new(dir.path());
        let lib = layout.lib_root();

        fs::create_dir_all(lib.join("gateway/balo/gateway/1.0.0")).unwrap();
        fs::write(lib.join("gateway/balo/gateway/1.0.0/gateway.balo"), b"balo").unwrap();
        fs::create_dir_all(lib.join("gateway/platform")).unwrap();
        fs::write(lib.join("gateway/platform/gateway-core.jar"), b"overlay-jar").unwrap();

        write_zip(
            &lib.join("platform.zip"),
            &[
                ("bin/run.sh", "#!/bin/sh\n", 0o755),
                ("bre/lib/gateway-core.jar", "archive-jar", 0o644),
                ("bre/lib/stdlib.jar", "stdlib", 0o644),
            ],
        );

        Fixture { _dir: dir, layout }
    }

    #[test]
    fn test_target_archive_is_sibling_zip() {
        let target = ExtractionTarget::new(TargetKind::Runtime, "/gw/lib/runtime");
        assert_eq!(target.archive(), Path::new("/gw/lib/runtime.zip"));
    }

    #[test]
    fn test_stage_extracts_archive_and_overlays() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);

        let outcome = stager.stage(&target).unwrap();

        let dest = target.destination();
        assert_eq!(outcome, StageOutcome::Staged);
        assert!(dest.join("bin/run.sh").is_file());
        assert_eq!(fs::read(dest.join("bre/lib/stdlib.jar")).unwrap(), b"stdlib");
        assert_eq!(
            fs::read(dest.join("lib/repo/gateway/1.0.0/gateway.balo")).unwrap(),
            b"balo"
        );
        assert!(stager.is_staged(&target));
    }

    #[test]
    fn test_overlay_wins_over_archive_content() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);

        stager.stage(&target).unwrap();

        assert_eq!(
            fs::read(target.destination().join("bre/lib/gateway-core.jar")).unwrap(),
            b"overlay-jar"
        );
    }

    #[test]
    fn test_later_overlay_wins_on_conflict() {
        let fx = fixture();
        let lib = fx.layout.lib_root();
        fs::create_dir_all(lib.join("first")).unwrap();
        fs::create_dir_all(lib.join("second")).unwrap();
        fs::write(lib.join("first/conf.toml"), b"first").unwrap();
        fs::write(lib.join("second/conf.toml"), b"second").unwrap();

        let stager = ArchiveStager::with_overlays(
            &lib,
            vec![Overlay::new("first", "conf"), Overlay::new("second", "conf")],
        );
        let target = fx.layout.target(TargetKind::Platform);
        stager.stage(&target).unwrap();

        assert_eq!(
            fs::read(target.destination().join("conf/conf.toml")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_stage_skips_completed_destination() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);
        stager.stage(&target).unwrap();

        // Remove the archive and the overlays: a skip must not touch either
        fs::remove_file(target.archive()).unwrap();
        fs::remove_dir_all(fx.layout.tracked_dir()).unwrap();
        fs::write(target.destination().join("bin/run.sh"), b"local edit").unwrap();

        let outcome = stager.stage(&target).unwrap();

        assert_eq!(outcome, StageOutcome::Skipped);
        assert!(!outcome.did_work());
        assert_eq!(
            fs::read(target.destination().join("bin/run.sh")).unwrap(),
            b"local edit"
        );
    }

    #[test]
    fn test_incomplete_destination_is_restaged() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);
        fs::create_dir_all(target.destination().join("bre")).unwrap();
        fs::write(target.destination().join("stale.tmp"), b"half").unwrap();

        let outcome = stager.stage(&target).unwrap();

        assert_eq!(outcome, StageOutcome::Restaged);
        assert!(!target.destination().join("stale.tmp").exists());
        assert!(target.destination().join("bin/run.sh").is_file());
        assert!(stager.is_staged(&target));
    }

    #[test]
    fn test_missing_overlay_source_leaves_unmarked_destination() {
        let fx = fixture();
        fs::remove_dir_all(fx.layout.tracked_dir().join("platform")).unwrap();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);

        let err = stager.stage(&target).unwrap_err();

        assert!(matches!(err, StagingError::OverlayMissing(_)));
        assert!(target.destination().exists());
        assert!(!stager.is_staged(&target));
    }

    #[test]
    fn test_discard_removes_staged_target() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);
        stager.stage(&target).unwrap();

        stager.discard(&target).unwrap();
        assert!(!target.destination().exists());

        // Absent targets are fine
        stager.discard(&target).unwrap();
    }

    #[test]
    fn test_discard_drops_marker_before_contents() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Platform);
        stager.stage(&target).unwrap();

        // A marker that cannot be removed as a file stops the discard up front
        let marker = target.destination().join(STAGED_MARKER);
        fs::remove_file(&marker).unwrap();
        fs::create_dir_all(marker.join("held")).unwrap();

        assert!(stager.discard(&target).is_err());
        assert!(target.destination().join("bin/run.sh").is_file());
        assert!(!stager.is_staged(&target));
    }

    #[test]
    fn test_missing_archive_fails() {
        let fx = fixture();
        let stager = ArchiveStager::new(&fx.layout);
        let target = fx.layout.target(TargetKind::Runtime);

        let err = stager.stage(&target).unwrap_err();

        assert!(matches!(err, StagingError::ArchiveMissing(_)));
        assert!(!target.destination().exists());
    }
}
