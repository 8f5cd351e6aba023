//! Narrow filesystem capability used by the backup operator and the purge.
//!
//! Everything the maintenance code does to disk goes through [`Filesystem`],
//! so the supervisor can be exercised against a fake that fails on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Result of clearing the direct children of a directory.
#[derive(Debug, Default)]
pub struct RemovedEntries {
    pub removed: usize,
    pub failed: Vec<(PathBuf, io::Error)>,
}

pub trait Filesystem {
    /// Names of the direct entries of `dir`. Entries whose names are not
    /// valid UTF-8 are left out.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn exists(&self, path: &Path) -> bool;

    /// Create `dir` and any missing parents. An existing directory is fine.
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Copy `src` into `dest_dir`, keeping its basename. Directories are
    /// copied recursively; existing files at the destination are overwritten.
    fn copy_path(&self, src: &Path, dest_dir: &Path) -> io::Result<()>;

    /// Delete the direct children of `dir` without descending into
    /// subdirectories. A missing `dir` removes nothing.
    fn remove_entries(&self, dir: &Path) -> io::Result<RemovedEntries>;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            // Entries can vanish between readdir and stat when another process
            // is pruning the directory.
            let Ok(entry) = entry else { continue };
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn copy_path(&self, src: &Path, dest_dir: &Path) -> io::Result<()> {
        let name = src.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", src.display()),
            )
        })?;
        let dest = dest_dir.join(name);
        if fs::metadata(src)?.is_dir() {
            copy_dir_recursive(src, &dest)
        } else {
            fs::copy(src, &dest).map(|_| ())
        }
    }

    fn remove_entries(&self, dir: &Path) -> io::Result<RemovedEntries> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(RemovedEntries::default())
            }
            Err(err) => return Err(err),
        };

        let mut outcome = RemovedEntries::default();
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => outcome.removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => outcome.failed.push((path, err)),
            }
        }
        Ok(outcome)
    }
}

/// Copy the tree under `src` to `dst` without following symlinks inside it.
///
/// Links are recreated as links. An entry that cannot be copied is logged and
/// the walk carries on with its siblings; the call still fails afterwards so
/// the item is reported as incomplete.
fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    let mut failures = 0usize;
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "could not read entry while copying");
                failures += 1;
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if let Err(err) = copy_entry(entry.path(), entry.file_type(), &target) {
            tracing::warn!(path = %entry.path().display(), error = %err, "could not copy entry");
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{failures} entries under {} could not be copied", src.display()),
        ));
    }
    Ok(())
}

fn copy_entry(src: &Path, file_type: fs::FileType, target: &Path) -> io::Result<()> {
    if file_type.is_dir() {
        fs::create_dir_all(target)
    } else if file_type.is_symlink() {
        copy_symlink(src, target)
    } else {
        fs::copy(src, target).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    // Merging into a snapshot from the same second may find the link already there.
    if fs::symlink_metadata(target).is_ok() {
        fs::remove_file(target)?;
    }
    std::os::unix::fs::symlink(link, target)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _target: &Path) -> io::Result<()> {
    tracing::warn!(path = %src.display(), "symlinks are not copied on this platform");
    Ok(())
}
