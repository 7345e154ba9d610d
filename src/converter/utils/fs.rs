//! File system utilities for conversion.
//!
//! Two kinds of scoped resources live here:
//!
//! - [`Scratch`]: a uniquely named temporary directory owned by one conversion
//!   call. Every intermediate artifact is created inside it, and dropping it
//!   removes everything recursively, on success, error or unwind.
//! - [`StagedOutput`] / [`StagedDir`]: results written next to their final
//!   location under a hidden temporary name, then renamed into place. Until
//!   they are persisted, dropping them deletes the partial output.

use crate::converter::error::{ErrorExt, Result};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};
use tempfile::{NamedTempFile, TempDir};

const SCRATCH_PREFIX: &str = "icon-convert-";
const STAGING_PREFIX: &str = ".icon-convert-";

/// Builder for staged entries: `mode` on Unix, not tempfile's owner-only default.
fn staging_builder(mode: u32) -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder
}

/// Per-call scratch directory for temporary artifacts.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Creates a fresh scratch directory under `root`, or the OS temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root).fs_context("creating scratch root", root)?;
                tempfile::Builder::new()
                    .prefix(SCRATCH_PREFIX)
                    .tempdir_in(root)
                    .fs_context("creating scratch directory in", root)?
            }
            None => tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .tempdir()
                .fs_context("creating scratch directory in", std::env::temp_dir())?,
        };

        log::debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a named artifact inside the scratch directory.
    ///
    /// Nothing is created; the artifact is removed with the directory.
    pub fn artifact(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        log::debug!("Registered temporary artifact {}", path.display());
        path
    }

    /// Creates a nested scoped directory with its own cleanup guard.
    pub fn nested_dir(&self, prefix: &str) -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(self.dir.path())
            .fs_context("creating working directory in", self.dir.path())
    }

    /// Removes the scratch directory now, logging instead of failing.
    ///
    /// Cleanup problems never turn a finished conversion into a failure.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            log::warn!("Failed to remove scratch directory {}: {}", path.display(), e);
        }
    }
}

/// A single output file staged inside the output directory.
#[derive(Debug)]
pub struct StagedOutput {
    file: NamedTempFile,
    destination: PathBuf,
}

impl StagedOutput {
    /// Stages a new empty file that will become `destination`.
    pub fn new(destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        let dir = parent_dir(&destination);
        let file = staging_builder(0o644)
            .tempfile_in(&dir)
            .fs_context("staging output in", &dir)?;

        Ok(Self { file, destination })
    }

    /// Temporary path of the staged file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Final path the file is persisted to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Writable handle to the staged file.
    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Renames the staged file onto its destination, replacing any old file.
    pub fn persist(self) -> Result<PathBuf> {
        let destination = self.destination;
        self.file
            .persist(&destination)
            .map_err(|e| e.error)
            .fs_context("persisting output", &destination)?;

        log::info!("Wrote {}", destination.display());
        Ok(destination)
    }
}

/// Persists every staged output, or none of them.
///
/// Files already at a destination are moved aside first. If any rename fails,
/// outputs persisted so far are removed and the moved-aside files are put
/// back, so a failed multi-file target leaves the directory as it found it.
pub fn commit_all(staged: Vec<StagedOutput>) -> Result<Vec<PathBuf>> {
    let mut committed: Vec<(PathBuf, Option<Displaced>)> = Vec::with_capacity(staged.len());

    for output in staged {
        let destination = output.destination().to_path_buf();
        let attempt = Displaced::set_aside(&destination, false).and_then(|displaced| {
            match output.persist() {
                Ok(path) => Ok((path, displaced)),
                Err(e) => {
                    if let Some(previous) = displaced {
                        previous.restore(&destination);
                    }
                    Err(e)
                }
            }
        });

        match attempt {
            Ok(entry) => committed.push(entry),
            Err(e) => {
                for (path, displaced) in committed.into_iter().rev() {
                    match displaced {
                        Some(previous) => previous.restore(&path),
                        None => {
                            if let Err(remove_err) = fs::remove_file(&path) {
                                log::warn!(
                                    "Failed to roll back {}: {}",
                                    path.display(),
                                    remove_err
                                );
                            }
                        }
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(committed.into_iter().map(|(path, _)| path).collect())
}

/// An existing entry moved out of the way of an output.
///
/// The entry waits in a hidden temporary directory next to its old path and
/// is deleted with that directory on drop unless [`restore`](Self::restore)
/// moves it back.
#[derive(Debug)]
struct Displaced {
    holder: TempDir,
}

impl Displaced {
    const ENTRY: &'static str = "previous";

    /// Moves the entry at `path` aside; `None` if nothing movable is there.
    ///
    /// Directories are only moved when `dirs` is set.
    fn set_aside(path: &Path, dirs: bool) -> Result<Option<Self>> {
        match fs::symlink_metadata(path) {
            Ok(meta) if dirs || !meta.is_dir() => {}
            _ => return Ok(None),
        }

        let parent = parent_dir(path);
        let holder = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&parent)
            .fs_context("setting aside existing output in", &parent)?;
        fs::rename(path, holder.path().join(Self::ENTRY))
            .fs_context("setting aside existing output", path)?;

        log::debug!("Moved existing {} aside", path.display());
        Ok(Some(Self { holder }))
    }

    /// Moves the entry back to `path`, replacing whatever is there now.
    fn restore(self, path: &Path) {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => {
                let _ = fs::remove_dir_all(path);
            }
            Ok(_) => {
                let _ = fs::remove_file(path);
            }
            Err(_) => {}
        }

        if let Err(e) = fs::rename(self.holder.path().join(Self::ENTRY), path) {
            log::warn!("Failed to restore {}: {}", path.display(), e);
            // Leave the entry on disk instead of deleting it with the holder.
            let _ = self.holder.keep();
        }
    }
}

/// A directory output staged inside the output directory.
#[derive(Debug)]
pub struct StagedDir {
    dir: TempDir,
    destination: PathBuf,
}

impl StagedDir {
    /// Stages a new empty directory that will become `destination`.
    pub fn new(destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        let parent = parent_dir(&destination);
        let dir = staging_builder(0o755)
            .tempdir_in(&parent)
            .fs_context("staging output directory in", &parent)?;

        Ok(Self { dir, destination })
    }

    /// Temporary path of the staged directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Moves the staged directory into place.
    ///
    /// An existing entry at the destination is replaced as a whole, so files
    /// from an earlier run do not survive. If the move fails the old entry is
    /// put back.
    pub fn persist(self) -> Result<PathBuf> {
        let destination = self.destination;
        let displaced = Displaced::set_aside(&destination, true)?;

        if let Err(e) = fs::rename(self.dir.path(), &destination)
            .fs_context("moving output directory to", &destination)
        {
            if let Some(previous) = displaced {
                previous.restore(&destination);
            }
            return Err(e);
        }
        drop(displaced);

        log::info!("Wrote {}", destination.display());
        Ok(destination)
    }
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(crate::converter::Error::Fs {
            context: "copying",
            path: from.to_path_buf(),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
        });
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).fs_context("copying to", to)?;
    Ok(())
}

/// Stages a byte-for-byte copy of `from` and persists it at `destination`.
pub fn install_copy(from: &Path, destination: &Path) -> Result<PathBuf> {
    let mut staged = StagedOutput::new(destination)?;
    let mut source = File::open(from).fs_context("opening", from)?;
    std::io::copy(&mut source, staged.file_mut()).fs_context("copying to", staged.path())?;
    staged.persist()
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("read_dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn scratch_is_removed_on_drop_and_close() {
        let root = tempfile::tempdir().expect("tempdir");

        let scratch = Scratch::create(Some(root.path())).expect("scratch");
        fs::write(scratch.artifact("a.png"), b"x").expect("write");
        drop(scratch);
        assert!(entries(root.path()).is_empty());

        let scratch = Scratch::create(Some(root.path())).expect("scratch");
        let nested = scratch.nested_dir("icns-").expect("nested");
        fs::write(nested.path().join("16x16.png"), b"x").expect("write");
        std::mem::forget(nested);
        scratch.close();
        assert!(entries(root.path()).is_empty());
    }

    #[test]
    fn dropped_staged_output_leaves_nothing() {
        let out = tempfile::tempdir().expect("tempdir");
        let mut staged = StagedOutput::new(out.path().join("icon.ico")).expect("stage");
        staged.file_mut().write_all(b"partial").expect("write");
        drop(staged);
        assert!(entries(out.path()).is_empty());
    }

    #[test]
    fn commit_all_persists_everything() {
        let out = tempfile::tempdir().expect("tempdir");
        let mut first = StagedOutput::new(out.path().join("a_favicon.ico")).expect("stage");
        first.file_mut().write_all(b"ico").expect("write");
        let mut second = StagedOutput::new(out.path().join("a_favicon.png")).expect("stage");
        second.file_mut().write_all(b"png").expect("write");

        let paths = commit_all(vec![first, second]).expect("commit");

        assert_eq!(paths.len(), 2);
        assert_eq!(entries(out.path()), vec!["a_favicon.ico", "a_favicon.png"]);
    }

    #[test]
    fn commit_all_rolls_back_on_failure() {
        let out = tempfile::tempdir().expect("tempdir");
        let first = StagedOutput::new(out.path().join("a_favicon.ico")).expect("stage");
        let blocker = out.path().join("a_favicon.png");
        fs::create_dir(&blocker).expect("mkdir");
        fs::write(blocker.join("keep"), b"x").expect("write");
        // A directory at a file destination is never moved; the rename fails.
        let second = StagedOutput::new(&blocker).expect("stage");

        assert!(commit_all(vec![first, second]).is_err());
        assert_eq!(entries(out.path()), vec!["a_favicon.png"]);
        assert_eq!(entries(&blocker), vec!["keep"]);
    }

    #[test]
    fn commit_all_restores_overwritten_files_on_failure() {
        let out = tempfile::tempdir().expect("tempdir");
        let existing = out.path().join("site_favicon.ico");
        fs::write(&existing, b"old ico").expect("write");

        let mut first = StagedOutput::new(&existing).expect("stage");
        first.file_mut().write_all(b"new ico").expect("write");
        let blocker = out.path().join("site_favicon.png");
        fs::create_dir(&blocker).expect("mkdir");
        fs::write(blocker.join("keep"), b"x").expect("write");
        let second = StagedOutput::new(&blocker).expect("stage");

        assert!(commit_all(vec![first, second]).is_err());
        assert_eq!(fs::read(&existing).expect("read"), b"old ico");
        assert_eq!(entries(out.path()), vec!["site_favicon.ico", "site_favicon.png"]);
    }

    #[test]
    fn commit_all_replaces_existing_files() {
        let out = tempfile::tempdir().expect("tempdir");
        let existing = out.path().join("a.ico");
        fs::write(&existing, b"old").expect("write");
        let mut staged = StagedOutput::new(&existing).expect("stage");
        staged.file_mut().write_all(b"new").expect("write");

        commit_all(vec![staged]).expect("commit");

        assert_eq!(fs::read(&existing).expect("read"), b"new");
        assert_eq!(entries(out.path()), vec!["a.ico"]);
    }

    #[test]
    fn staged_dir_moves_into_place() {
        let out = tempfile::tempdir().expect("tempdir");
        let staged = StagedDir::new(out.path().join("app_icns")).expect("stage");
        fs::write(staged.path().join("16x16.png"), b"x").expect("write");

        let dest = staged.persist().expect("persist");

        assert_eq!(entries(out.path()), vec!["app_icns"]);
        assert_eq!(entries(&dest), vec!["16x16.png"]);
    }

    #[test]
    fn staged_dir_replaces_existing_directory() {
        let out = tempfile::tempdir().expect("tempdir");
        let existing = out.path().join("app_icns");
        fs::create_dir(&existing).expect("mkdir");
        fs::write(existing.join("16x16.png"), b"old").expect("write");
        fs::write(existing.join("stale.png"), b"old").expect("write");

        let staged = StagedDir::new(&existing).expect("stage");
        fs::write(staged.path().join("16x16.png"), b"new").expect("write");
        staged.persist().expect("persist");

        assert_eq!(entries(&existing), vec!["16x16.png"]);
        assert_eq!(fs::read(existing.join("16x16.png")).expect("read"), b"new");
        assert_eq!(entries(out.path()), vec!["app_icns"]);
    }

    #[cfg(unix)]
    #[test]
    fn persisted_output_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let out = tempfile::tempdir().expect("tempdir");
        let path = StagedOutput::new(out.path().join("icon.png"))
            .expect("stage")
            .persist()
            .expect("persist");

        let mode = fs::metadata(path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o044, 0o044);
    }

    #[test]
    fn install_copy_is_byte_exact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let from = dir.path().join("in.svg");
        fs::write(&from, b"<svg/>\n").expect("write");

        let to = install_copy(&from, &dir.path().join("out.svg")).expect("copy");

        assert_eq!(fs::read(to).expect("read"), b"<svg/>\n");
    }
}
