/// Moving the top-level files of a folder into category subfolders.
///
/// [`Organizer`] scans a target directory, classifies every regular file
/// through an [`ExtensionIndex`], creates category folders on demand and
/// moves each file unless a same-named entry is already at the destination.
/// Progress is surfaced through a [`ProgressReporter`]; the outcome of a run
/// is a [`RunSummary`].
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::CompiledFilters;
use crate::file_category::{ExtensionIndex, extension_of};

/// Errors that can occur during file organization.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target directory does not exist.
    #[error("folder {} does not exist", .path.display())]
    TargetMissing { path: PathBuf },

    /// The target exists but is not a directory.
    #[error("{} is not a folder", .path.display())]
    NotADirectory { path: PathBuf },

    /// Listing the target directory failed.
    #[error("could not read folder {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating a category folder failed.
    #[error("could not create folder {}: {source}", .path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Moving one file failed.
    #[error("could not move {} to {}: {source}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// One top-level regular file found at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name, including the extension.
    pub name: String,
    /// Extension with its leading dot, original case, empty when absent.
    pub extension: String,
    pub path: PathBuf,
}

impl FileEntry {
    /// Builds an entry from a path. Returns `None` for paths without a file
    /// name component.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let extension = extension_of(&path);
        Some(Self {
            name,
            extension,
            path,
        })
    }
}

/// A file that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one organizer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub target: PathBuf,
    /// Set when nothing was actually touched.
    pub dry_run: bool,
    pub files_found: usize,
    pub moved: usize,
    /// Files left in place because the destination name was taken.
    pub skipped: usize,
    /// Names of category folders created by this run.
    pub created_folders: Vec<String>,
    /// Moved files per category, in processing order.
    pub moved_by_category: IndexMap<String, usize>,
    pub failures: Vec<MoveFailure>,
}

impl RunSummary {
    fn new(target: &Path, dry_run: bool) -> Self {
        Self {
            target: target.to_path_buf(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn folders_created(&self) -> usize {
        self.created_folders.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when the run found nothing to organize.
    pub fn is_empty(&self) -> bool {
        self.files_found == 0
    }
}

/// Receives progress events while the organizer runs.
///
/// Every hook has a no-op default so implementors only override what they
/// display.
pub trait ProgressReporter {
    fn files_found(&mut self, _count: usize) {}
    fn no_files(&mut self, _target: &Path) {}
    fn category_started(&mut self, _category: &str, _count: usize) {}
    fn folder_created(&mut self, _folder: &Path) {}
    fn file_moved(&mut self, _entry: &FileEntry, _category: &str) {}
    fn file_skipped(&mut self, _entry: &FileEntry, _category: &str) {}
    fn file_failed(&mut self, _entry: &FileEntry, _error: &OrganizeError) {}
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Organizes a folder's top-level files into category subfolders.
///
/// Borrows the extension index and filters built at start-up; holds no
/// state between runs.
pub struct Organizer<'a> {
    index: &'a ExtensionIndex,
    filters: &'a CompiledFilters,
    dry_run: bool,
}

impl<'a> Organizer<'a> {
    pub fn new(index: &'a ExtensionIndex, filters: &'a CompiledFilters) -> Self {
        Self {
            index,
            filters,
            dry_run: false,
        }
    }

    /// Reports what would happen without creating or moving anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Lists the top-level regular files of `target` that pass the filters,
    /// sorted by name.
    ///
    /// Symbolic links and directories are never included.
    pub fn scan(&self, target: &Path) -> OrganizeResult<Vec<FileEntry>> {
        validate_target(target)?;

        let entries = fs::read_dir(target).map_err(|e| OrganizeError::ReadDir {
            path: target.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            // DirEntry::file_type does not follow symlinks
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let Some(file) = FileEntry::from_path(entry.path()) else {
                continue;
            };
            if self.filters.should_include(&file.name) {
                files.push(file);
            } else {
                tracing::debug!(file = %file.name, "excluded by filters");
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Groups entries by category, in order of each category's first
    /// appearance.
    pub fn group<'f>(&self, files: &'f [FileEntry]) -> IndexMap<&'a str, Vec<&'f FileEntry>> {
        let mut groups: IndexMap<&'a str, Vec<&'f FileEntry>> = IndexMap::new();
        for file in files {
            let category = self.index.classify(&file.extension);
            groups.entry(category).or_default().push(file);
        }
        groups
    }

    /// Runs the full scan, classify and move pipeline on `target`.
    ///
    /// Only a missing or unreadable target aborts the run; a file that
    /// cannot be moved is recorded in the summary and the run continues.
    ///
    /// # Arguments
    ///
    /// * `target` - Folder to organize
    /// * `reporter` - Receives one event per category and per file
    ///
    /// # Errors
    ///
    /// [`OrganizeError::TargetMissing`], [`OrganizeError::NotADirectory`] or
    /// [`OrganizeError::ReadDir`]; nothing has been changed in those cases.
    pub fn organize(
        &self,
        target: &Path,
        reporter: &mut dyn ProgressReporter,
    ) -> OrganizeResult<RunSummary> {
        tracing::info!(target = %target.display(), dry_run = self.dry_run, "organizing folder");

        let files = self.scan(target)?;
        let mut summary = RunSummary::new(target, self.dry_run);
        summary.files_found = files.len();

        if files.is_empty() {
            reporter.no_files(target);
            return Ok(summary);
        }
        reporter.files_found(files.len());

        // top-level paths this run has moved (or would move) out of the way
        let mut vacated: HashSet<&Path> = HashSet::new();

        for (category, group) in self.group(&files) {
            reporter.category_started(category, group.len());
            let folder = target.join(category);

            if let Err(error) =
                self.ensure_folder(&folder, category, &vacated, &mut summary, reporter)
            {
                tracing::warn!(error = %error, "category folder unavailable");
                for entry in group {
                    reporter.file_failed(entry, &error);
                    summary.failures.push(MoveFailure {
                        path: entry.path.clone(),
                        reason: error.to_string(),
                    });
                }
                continue;
            }

            for entry in group {
                let destination = folder.join(&entry.name);

                if entry_exists(&destination) {
                    tracing::debug!(file = %entry.name, category, "destination taken, skipping");
                    reporter.file_skipped(entry, category);
                    summary.skipped += 1;
                    continue;
                }

                match self.relocate(&entry.path, &destination) {
                    Ok(()) => {
                        vacated.insert(entry.path.as_path());
                        tracing::debug!(file = %entry.name, category, "moved");
                        reporter.file_moved(entry, category);
                        summary.moved += 1;
                        *summary
                            .moved_by_category
                            .entry(category.to_string())
                            .or_insert(0) += 1;
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "move failed");
                        reporter.file_failed(entry, &error);
                        summary.failures.push(MoveFailure {
                            path: entry.path.clone(),
                            reason: error.to_string(),
                        });
                    }
                }
            }
        }

        tracing::info!(
            moved = summary.moved,
            skipped = summary.skipped,
            failed = summary.failed(),
            folders_created = summary.folders_created(),
            "organization finished"
        );
        Ok(summary)
    }

    /// Creates the category folder if needed. An existing directory is
    /// reused silently.
    ///
    /// In a dry run a file in the way does not block the folder when this
    /// run already planned to move that file elsewhere.
    fn ensure_folder(
        &self,
        folder: &Path,
        category: &str,
        vacated: &HashSet<&Path>,
        summary: &mut RunSummary,
        reporter: &mut dyn ProgressReporter,
    ) -> OrganizeResult<()> {
        if folder.is_dir() {
            return Ok(());
        }

        if !self.dry_run {
            if let Err(e) = fs::create_dir(folder) {
                // lost a race with another creator; still fine if it is a directory now
                if !(e.kind() == io::ErrorKind::AlreadyExists && folder.is_dir()) {
                    return Err(OrganizeError::CreateFolder {
                        path: folder.to_path_buf(),
                        source: e,
                    });
                }
                return Ok(());
            }
        } else if entry_exists(folder) && !vacated.contains(folder) {
            return Err(OrganizeError::CreateFolder {
                path: folder.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a file with this name is in the way",
                ),
            });
        }

        summary.created_folders.push(category.to_string());
        reporter.folder_created(folder);
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) -> OrganizeResult<()> {
        if self.dry_run {
            return Ok(());
        }
        move_file(from, to).map_err(|e| OrganizeError::MoveFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        })
    }
}

/// Checks that `target` exists and is a directory.
pub fn validate_target(target: &Path) -> OrganizeResult<()> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(OrganizeError::NotADirectory {
            path: target.to_path_buf(),
        }),
        Err(_) => Err(OrganizeError::TargetMissing {
            path: target.to_path_buf(),
        }),
    }
}

/// Moves a file, falling back to copy-then-delete across devices.
///
/// The fallback is not crash-atomic: an interruption between the copy and
/// the delete leaves the file in both places.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), "rename crosses devices, copying");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}

/// True if anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
