//! Recipe persistence.
//!
//! [`RecipeRepository`] owns the in-memory recipe index for one storage root
//! and keeps it consistent with the detail documents on disk. Every mutation
//! is written through immediately: the index file is rewritten whole and the
//! detail document for the touched recipe is overwritten whole.
//!
//! Each mutation comes in two forms. The `try_` form returns a [`Result`] and
//! reports whether the target id was known. The plain form logs any failure
//! and returns nothing, which is what a UI that cannot surface errors wants.

pub mod layout;

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::assets::AssetStore;
use crate::config::{Config, ImageConfig};
use crate::error::{Error, Result};
use crate::model::{RecipeDetail, RecipeSummary};

pub use layout::StorageLayout;

/// What a mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// The recipe was found and the change was made.
    Applied,
    /// No recipe with that id is in the index; nothing was changed.
    UnknownId,
}

/// The authoritative recipe index for one storage root.
///
/// Create one per storage root and pass it to whatever needs it. Summaries
/// are held in memory; detail documents are read from disk on every access.
#[derive(Debug)]
pub struct RecipeRepository {
    layout: StorageLayout,
    assets: AssetStore,
    recipes: Vec<RecipeSummary>,
}

impl RecipeRepository {
    /// Open the repository at `root`.
    ///
    /// Creates missing directories and loads the index. Neither step is
    /// fatal: a directory that can't be created is logged and later reads or
    /// writes fail on their own, and a missing or malformed index starts the
    /// repository empty.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>, images: ImageConfig) -> Self {
        let layout = StorageLayout::new(root);

        if let Err(e) = layout.ensure_directories() {
            warn!("Storage root {} is not fully usable: {}", layout.root().display(), e);
        }

        let recipes = match read_json::<Vec<RecipeSummary>>(&layout.index_path()) {
            Ok(recipes) => recipes,
            Err(e) if e.is_not_found() => {
                debug!("No recipe index at {}", layout.index_path().display());
                Vec::new()
            }
            Err(e) => {
                warn!("Error loading recipes, starting empty: {}", e);
                Vec::new()
            }
        };
        info!(
            "Loaded {} recipes from {}",
            recipes.len(),
            layout.root().display()
        );

        let assets = AssetStore::new(layout.images_dir(), images);
        Self {
            layout,
            assets,
            recipes,
        }
    }

    /// Open the repository described by a configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::open(config.storage_root(), config.images)
    }

    /// The storage layout.
    #[must_use]
    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// The asset store for this root's images directory.
    #[must_use]
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// All summaries, in insertion order.
    #[must_use]
    pub fn list_recipes(&self) -> &[RecipeSummary] {
        &self.recipes
    }

    /// Look up one summary.
    #[must_use]
    pub fn get_summary(&self, id: Uuid) -> Option<&RecipeSummary> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Summaries whose name or ingredients contain `query`, in index order.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&RecipeSummary> {
        self.recipes.iter().filter(|r| r.matches(query)).collect()
    }

    /// Read a recipe's detail document.
    ///
    /// Missing and malformed documents both come back as `None`.
    #[must_use]
    pub fn get_detail(&self, id: Uuid) -> Option<RecipeDetail> {
        match self.try_get_detail(id) {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Error loading recipe detail: {}", e);
                None
            }
        }
    }

    /// Strict form of [`get_detail`](Self::get_detail). A missing document is
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for a malformed document and
    /// [`Error::FileRead`] if it exists but cannot be read.
    pub fn try_get_detail(&self, id: Uuid) -> Result<Option<RecipeDetail>> {
        match read_json(&self.layout.detail_path(id)) {
            Ok(detail) => Ok(Some(detail)),
            Err(e) if e.is_not_found() => {
                debug!("No detail document for recipe {}", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The detail document, or the default one derived from the summary if
    /// the recipe has none on disk yet. Nothing is written.
    ///
    /// Returns `None` only for an id that is not in the index.
    #[must_use]
    pub fn detail_or_default(&self, id: Uuid) -> Option<RecipeDetail> {
        let summary = self.get_summary(id)?;
        Some(
            self.get_detail(id)
                .unwrap_or_else(|| RecipeDetail::from_summary(summary)),
        )
    }

    /// Add a recipe, logging any failure.
    ///
    /// See [`try_add_recipe`](Self::try_add_recipe).
    pub fn add_recipe(&mut self, summary: RecipeSummary, detail: Option<RecipeDetail>) {
        let id = summary.id;
        if let Err(e) = self.try_add_recipe(summary, detail) {
            error!("Error adding recipe {}: {}", id, e);
        }
    }

    /// Append a recipe to the index and write its detail document.
    ///
    /// Without a `detail`, the default detail derived from the summary is
    /// written. The summary stays in the in-memory index even if a write
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRecipe`] or [`Error::DetailMismatch`] before
    /// changing anything, or the first write error.
    pub fn try_add_recipe(
        &mut self,
        summary: RecipeSummary,
        detail: Option<RecipeDetail>,
    ) -> Result<()> {
        if self.get_summary(summary.id).is_some() {
            return Err(Error::DuplicateRecipe { id: summary.id });
        }
        let detail = match detail {
            Some(detail) => {
                check_detail_owner(&summary, &detail)?;
                detail
            }
            None => RecipeDetail::from_summary(&summary),
        };

        self.recipes.push(summary);
        let index_result = self.save_index();
        let detail_result = self.save_detail(&detail);
        index_result.and(detail_result)
    }

    /// Update a recipe, logging any failure.
    ///
    /// An id that is not in the index is ignored.
    /// See [`try_update_recipe`](Self::try_update_recipe).
    pub fn update_recipe(&mut self, summary: RecipeSummary, detail: Option<RecipeDetail>) {
        let id = summary.id;
        match self.try_update_recipe(summary, detail) {
            Ok(Mutation::Applied) => {}
            Ok(Mutation::UnknownId) => debug!("Ignoring update for unknown recipe {}", id),
            Err(e) => error!("Error updating recipe {}: {}", id, e),
        }
    }

    /// Replace a recipe's summary in place and bring its detail in line.
    ///
    /// With a `detail`, that document replaces the stored one. Without, the
    /// stored detail (if any) gets the summary overlaid via
    /// [`RecipeDetail::apply_summary`]; a recipe with no detail on disk gets
    /// none written. A detail that exists but can't be decoded is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetailMismatch`] before changing anything, or the
    /// first read or write error.
    pub fn try_update_recipe(
        &mut self,
        summary: RecipeSummary,
        detail: Option<RecipeDetail>,
    ) -> Result<Mutation> {
        if let Some(detail) = &detail {
            check_detail_owner(&summary, detail)?;
        }
        let Some(pos) = self.position(summary.id) else {
            return Ok(Mutation::UnknownId);
        };

        self.recipes[pos] = summary;
        let index_result = self.save_index();

        let summary = &self.recipes[pos];
        let detail_result = match detail {
            Some(detail) => self.save_detail(&detail),
            None => match self.try_get_detail(summary.id) {
                Ok(Some(mut existing)) => {
                    existing.apply_summary(summary);
                    self.save_detail(&existing)
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
        };

        index_result.and(detail_result).map(|()| Mutation::Applied)
    }

    /// Delete a recipe, logging any failure.
    ///
    /// See [`try_delete_recipe`](Self::try_delete_recipe).
    pub fn delete_recipe(&mut self, summary: &RecipeSummary) {
        match self.try_delete_recipe(summary) {
            Ok(Mutation::Applied) => {}
            Ok(Mutation::UnknownId) => debug!("Ignoring delete for unknown recipe {}", summary.id),
            Err(e) => error!("Error deleting recipe {}: {}", summary.id, e),
        }
    }

    /// Remove a recipe, its detail document and every image the detail
    /// references.
    ///
    /// The detail is read before anything is removed so its image paths are
    /// known. If it can't be read, the recipe is still removed and its images
    /// are left on disk. Image removal is best effort and never fails the
    /// call.
    ///
    /// # Errors
    ///
    /// Returns the first error writing the index or removing the detail
    /// document. A detail document that is already gone is not an error.
    pub fn try_delete_recipe(&mut self, summary: &RecipeSummary) -> Result<Mutation> {
        let id = summary.id;
        let Some(pos) = self.position(id) else {
            return Ok(Mutation::UnknownId);
        };

        let detail = self.try_get_detail(id).unwrap_or_else(|e| {
            warn!("Recipe {} detail unreadable, its images stay on disk: {}", id, e);
            None
        });

        self.recipes.remove(pos);
        let index_result = self.save_index();
        let detail_result = self.remove_detail(id);

        if let Some(detail) = detail {
            for path in detail.image_paths() {
                self.assets.delete(path);
            }
        }

        index_result.and(detail_result).map(|()| Mutation::Applied)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.recipes.iter().position(|r| r.id == id)
    }

    fn save_index(&self) -> Result<()> {
        write_json(&self.layout.index_path(), &self.recipes)?;
        debug!("Saved {} recipes", self.recipes.len());
        Ok(())
    }

    fn save_detail(&self, detail: &RecipeDetail) -> Result<()> {
        write_json(&self.layout.detail_path(detail.id), detail)?;
        debug!("Saved recipe detail for {}", detail.id);
        Ok(())
    }

    fn remove_detail(&self, id: Uuid) -> Result<()> {
        let path = self.layout.detail_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::FileRemove { path, source }),
        }
    }
}

fn check_detail_owner(summary: &RecipeSummary, detail: &RecipeDetail) -> Result<()> {
    if detail.id == summary.id {
        Ok(())
    } else {
        Err(Error::DetailMismatch {
            summary: summary.id,
            detail: detail.id,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read(path).map_err(|source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` to a sibling temp file, then rename it over `path`.
///
/// A crash mid-write leaves the previous document in place.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    let tmp = temp_path_for(path);

    let written = write_synced(&tmp, &data).and_then(|()| std::fs::rename(&tmp, path));
    written.map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        Error::FileWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document");
    path.with_file_name(format!(".{name}.tmp.{}", std::process::id()))
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
