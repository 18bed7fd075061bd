//! Recursive copy and removal primitives

use crate::error::StagingError;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Copy `source` into `dest`, creating missing directories and overwriting
/// files that already exist. Symlinks are copied as links, not followed.
/// Returns the number of files copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, StagingError> {
    let mut copied = 0;

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| StagingError::Walk {
            path: source.to_path_buf(),
            source: e,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| StagingError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StagingError::io(parent, e))?;
        }
        if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target).map_err(|e| StagingError::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StagingError::io(&target, e))?;
        }
        copied += 1;
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(source)?;
    remove_tree(target)?;
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target).map(|_| ())
}

/// Remove a directory tree or file; absent paths are not an error
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
