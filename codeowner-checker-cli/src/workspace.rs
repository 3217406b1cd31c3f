use std::path::{Component, Path, PathBuf};

use codeowner_checker::{root_directory_for, OwnershipFile, CODEOWNERS_FILE_NAME};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::{debug, warn};

/// A directory tree containing the files being checked and the ownership
/// files that govern them.
pub struct Workspace {
    root: PathBuf,
    cwd: PathBuf,
}

impl Workspace {
    /// `root` and any relative paths given later are resolved against `cwd`.
    pub fn new(root: impl AsRef<Path>, cwd: impl AsRef<Path>) -> Self {
        let cwd = normalize(cwd.as_ref());
        Self {
            root: normalize(&cwd.join(root)),
            cwd,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert `path` into a workspace-relative path with forward slashes.
    /// Paths outside the workspace are returned whole.
    pub fn relative_path(&self, path: impl AsRef<Path>) -> String {
        let absolute = normalize(&self.cwd.join(path));
        match absolute.strip_prefix(&self.root) {
            Ok(relative) => relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => absolute.to_string_lossy().replace('\\', "/"),
        }
    }

    /// Every `CODEOWNERS` file in the workspace, sorted by path. Symlinks are
    /// followed; `.git` directories are skipped.
    pub fn discover(&self) -> Vec<PathBuf> {
        walkdir::WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git")
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable workspace entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.file_name() == CODEOWNERS_FILE_NAME)
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Discover and parse every ownership file, keeping discovery order.
    /// Files that can't be read are logged and left out.
    pub fn load_ownership_files(&self) -> Vec<OwnershipFile> {
        let paths = self.discover();

        #[cfg(feature = "rayon")]
        let paths_iter = paths.par_iter();
        #[cfg(not(feature = "rayon"))]
        let paths_iter = paths.iter();

        paths_iter
            .filter_map(|path| match self.load(path) {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable ownership file");
                    None
                }
            })
            .collect()
    }

    fn load(&self, path: &Path) -> Result<OwnershipFile, codeowner_checker::Error> {
        let relative = self.relative_path(path);
        let root_directory = root_directory_for(&relative);
        debug!(path = %relative, root = root_directory, "loading ownership file");
        codeowner_checker::from_path(path, root_directory)
    }
}

// Lexically resolve `.` and `..` so prefix checks work on user-supplied paths.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
