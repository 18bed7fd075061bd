//! Zip extraction for runtime and platform bundles

use super::fs_ops::remove_tree;
use crate::error::StagingError;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};
use tracing::debug;
use zip::ZipArchive;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Extract every entry of `archive` into `destination`.
///
/// Entry names that would resolve outside `destination` are rejected, and so
/// are symlink entries whose target does. Symlinks are recreated as links on
/// unix and written as plain files holding the target elsewhere. With
/// `preserve_executable_bits` the unix permission bits stored in the archive
/// are applied to extracted files. Returns the number of files written.
pub fn unzip(
    archive: &Path,
    destination: &Path,
    preserve_executable_bits: bool,
) -> Result<usize, StagingError> {
    if !archive.is_file() {
        return Err(StagingError::ArchiveMissing(archive.to_path_buf()));
    }

    let file = File::open(archive).map_err(|e| StagingError::io(archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|source| StagingError::Archive {
        path: archive.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(destination).map_err(|e| StagingError::io(destination, e))?;

    let mut extracted = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| StagingError::Archive {
            path: archive.to_path_buf(),
            source,
        })?;

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| StagingError::UnsafeEntry {
                archive: archive.to_path_buf(),
                entry: entry.name().to_string(),
            })?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let out_path = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| StagingError::io(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| StagingError::io(parent, e))?;
        }

        if entry.unix_mode().is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
            let mut link = String::new();
            entry
                .read_to_string(&mut link)
                .map_err(|e| StagingError::io(archive, e))?;
            if !link_stays_inside(&relative, Path::new(&link)) {
                return Err(StagingError::UnsafeEntry {
                    archive: archive.to_path_buf(),
                    entry: format!("{} -> {}", entry.name(), link),
                });
            }
            write_symlink(&link, &out_path).map_err(|e| StagingError::io(&out_path, e))?;
            extracted += 1;
            continue;
        }

        let mut out = File::create(&out_path).map_err(|e| StagingError::io(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| StagingError::io(&out_path, e))?;

        #[cfg(unix)]
        if preserve_executable_bits {
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| StagingError::io(&out_path, e))?;
            }
        }
        #[cfg(not(unix))]
        let _ = preserve_executable_bits;

        extracted += 1;
    }

    debug!(
        archive = %archive.display(),
        files = extracted,
        "extracted archive"
    );
    Ok(extracted)
}

/// Whether a link at `entry` pointing to `link` resolves under the extraction root
fn link_stays_inside(entry: &Path, link: &Path) -> bool {
    let mut depth = entry.parent().map_or(0, |p| p.components().count());
    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

#[cfg(unix)]
fn write_symlink(link: &str, out_path: &Path) -> io::Result<()> {
    remove_tree(out_path)?;
    std::os::unix::fs::symlink(link, out_path)
}

#[cfg(not(unix))]
fn write_symlink(link: &str, out_path: &Path) -> io::Result<()> {
    remove_tree(out_path)?;
    fs::write(out_path, link)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build a zip at `path` from `(name, contents, unix_mode)` entries
    pub(crate) fn write_zip(path: &Path, entries: &[(&str, &str, u32)]) {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            for (name, contents, mode) in entries {
                let options = SimpleFileOptions::default()
                    .compression_method(zip::CompressionMethod::Deflated)
                    .unix_permissions(*mode);
                zip.start_file(*name, options).unwrap();
                zip.write_all(contents.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        fs::write(path, buffer).unwrap();
    }

    #[test]
    fn test_unzip_extracts_nested_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("runtime.zip");
        write_zip(
            &archive,
            &[
                ("bin/gateway", "#!/bin/sh\n", 0o755),
                ("bre/lib/core.jar", "core", 0o644),
            ],
        );

        let dest = dir.path().join("runtime");
        let count = unzip(&archive, &dest, true).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read(dest.join("bre/lib/core.jar")).unwrap(), b"core");
        assert!(dest.join("bin/gateway").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_unzip_preserves_executable_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("runtime.zip");
        write_zip(&archive, &[("bin/gateway", "#!/bin/sh\n", 0o755)]);

        let dest = dir.path().join("runtime");
        unzip(&archive, &dest, true).unwrap();

        let mode = fs::metadata(dest.join("bin/gateway"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_unzip_missing_archive() {
        let dir = TempDir::new().unwrap();
        let result = unzip(&dir.path().join("nope.zip"), &dir.path().join("out"), true);
        assert!(matches!(result, Err(StagingError::ArchiveMissing(_))));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_unzip_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("platform.zip");
        fs::write(&archive, b"definitely not a zip").unwrap();

        let result = unzip(&archive, &dir.path().join("platform"), true);
        assert!(matches!(result, Err(StagingError::Archive { .. })));
    }

    fn write_zip_with_link(path: &Path, name: &str, link: &str) {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            zip.start_file("bin/gateway", options).unwrap();
            zip.write_all(b"#!/bin/sh\n").unwrap();
            zip.add_symlink(name, link, options).unwrap();
            zip.finish().unwrap();
        }
        fs::write(path, buffer).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unzip_recreates_symlinks() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("runtime.zip");
        write_zip_with_link(&archive, "bin/current", "gateway");

        let dest = dir.path().join("runtime");
        let count = unzip(&archive, &dest, true).unwrap();

        assert_eq!(count, 2);
        let link = dest.join("bin/current");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("gateway"));
        assert_eq!(fs::read(&link).unwrap(), b"#!/bin/sh\n");
    }

    #[test]
    fn test_unzip_rejects_symlink_leaving_destination() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("runtime.zip");
        write_zip_with_link(&archive, "bin/passwd", "../../etc/passwd");

        let result = unzip(&archive, &dir.path().join("runtime"), true);
        assert!(matches!(result, Err(StagingError::UnsafeEntry { .. })));
    }

    #[test]
    fn test_link_stays_inside() {
        assert!(link_stays_inside(Path::new("bin/current"), Path::new("gateway")));
        assert!(link_stays_inside(Path::new("bin/lib"), Path::new("../bre/lib")));
        assert!(!link_stays_inside(Path::new("bin/up"), Path::new("../..")));
        assert!(!link_stays_inside(Path::new("top"), Path::new("/etc/passwd")));
    }

    #[test]
    fn test_unzip_rejects_escaping_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("evil.zip");
        write_zip(&archive, &[("../outside.txt", "x", 0o644)]);

        let result = unzip(&archive, &dir.path().join("out"), true);
        assert!(matches!(result, Err(StagingError::UnsafeEntry { .. })));
        assert!(!dir.path().join("outside.txt").exists());
    }
}
