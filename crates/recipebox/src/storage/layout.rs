//! On-disk layout of a storage root.
//!
//! ```text
//! <root>/
//!   recipes.json          index: array of summaries
//!   details/<id>.json     one detail document per recipe
//!   images/<owner>_<random>.jpg
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Index file name.
pub const INDEX_FILE_NAME: &str = "recipes.json";

/// Detail documents directory name.
pub const DETAILS_DIR_NAME: &str = "details";

/// Images directory name.
pub const IMAGES_DIR_NAME: &str = "images";

/// Paths inside one storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Layout rooted at `root`. Nothing is created on disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The base directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The index file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE_NAME)
    }

    /// Directory holding detail documents.
    #[must_use]
    pub fn details_dir(&self) -> PathBuf {
        self.root.join(DETAILS_DIR_NAME)
    }

    /// Detail document for one recipe.
    #[must_use]
    pub fn detail_path(&self, id: Uuid) -> PathBuf {
        self.details_dir().join(format!("{id}.json"))
    }

    /// Directory holding image assets.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR_NAME)
    }

    /// Create the root, details and images directories if missing.
    ///
    /// Every directory is attempted even if an earlier one fails; each failure
    /// is logged and the first one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] for the first directory that could
    /// not be created.
    pub fn ensure_directories(&self) -> Result<()> {
        let mut first_error = None;

        for dir in [self.root.clone(), self.details_dir(), self.images_dir()] {
            if dir.is_dir() {
                continue;
            }
            match std::fs::create_dir_all(&dir) {
                Ok(()) => debug!("Created directory at {}", dir.display()),
                Err(source) => {
                    warn!("Failed to create directory {}: {}", dir.display(), source);
                    first_error.get_or_insert(Error::DirectoryCreate { path: dir, source });
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = StorageLayout::new("/data/recipebox");
        let id = Uuid::new_v4();

        assert_eq!(layout.root(), Path::new("/data/recipebox"));
        assert_eq!(layout.index_path(), PathBuf::from("/data/recipebox/recipes.json"));
        assert_eq!(layout.details_dir(), PathBuf::from("/data/recipebox/details"));
        assert_eq!(
            layout.detail_path(id),
            PathBuf::from(format!("/data/recipebox/details/{id}.json"))
        );
        assert_eq!(layout.images_dir(), PathBuf::from("/data/recipebox/images"));
    }

    #[test]
    fn test_ensure_directories_creates_all() {
        let temp = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(temp.path().join("nested").join("root"));

        layout.ensure_directories().unwrap();

        assert!(layout.root().is_dir());
        assert!(layout.details_dir().is_dir());
        assert!(layout.images_dir().is_dir());

        // Second call is a no-op
        layout.ensure_directories().unwrap();
    }

    #[test]
    fn test_ensure_directories_reports_failure() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let layout = StorageLayout::new(blocker.join("root"));
        let err = layout.ensure_directories().unwrap_err();
        assert!(matches!(err, Error::DirectoryCreate { .. }));
    }
}
