//! Editing sessions.
//!
//! A [`RecipeDraft`] holds the detail document a user is editing and applies
//! the image cleanup that goes with removing steps, notes or a cover photo.
//! [`ImageImport`] loads photos in the background and feeds the stored paths
//! into a step as each one finishes.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::assets::AssetStore;
use crate::error::Result;
use crate::model::{CookingNote, RecipeDetail, RecipeSummary, Step};
use crate::storage::{Mutation, RecipeRepository};

/// A recipe being created or edited.
///
/// Images removed from the draft are deleted from the asset store right away,
/// not when the draft is committed.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    detail: RecipeDetail,
    is_new: bool,
}

impl RecipeDraft {
    /// Start a draft for a recipe that doesn't exist yet.
    #[must_use]
    pub fn new_recipe() -> Self {
        Self {
            detail: RecipeDetail::from_summary(&RecipeSummary::default()),
            is_new: true,
        }
    }

    /// Start editing an existing recipe's detail.
    #[must_use]
    pub fn edit(detail: RecipeDetail) -> Self {
        Self {
            detail,
            is_new: false,
        }
    }

    /// Id of the recipe; use it as the owner when saving images.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.detail.id
    }

    /// Whether committing will add rather than update.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// The document as edited so far.
    #[must_use]
    pub fn detail(&self) -> &RecipeDetail {
        &self.detail
    }

    /// Direct access for plain fields such as name, description and category.
    pub fn detail_mut(&mut self) -> &mut RecipeDetail {
        &mut self.detail
    }

    /// Append an ingredient. Blank input is ignored.
    pub fn add_ingredient(&mut self, name: &str) -> bool {
        push_non_blank(&mut self.detail.ingredients, name)
    }

    /// Remove every ingredient with this name.
    pub fn remove_ingredient(&mut self, name: &str) {
        self.detail.ingredients.retain(|i| i != name);
    }

    /// Append a seasoning. Blank input is ignored.
    pub fn add_seasoning(&mut self, name: &str) -> bool {
        push_non_blank(&mut self.detail.seasonings, name)
    }

    /// Remove every seasoning with this name.
    pub fn remove_seasoning(&mut self, name: &str) {
        self.detail.seasonings.retain(|s| s != name);
    }

    /// Append a step. A step without a description is ignored.
    pub fn add_step(&mut self, step: Step) -> bool {
        if step.description.trim().is_empty() {
            return false;
        }
        self.detail.steps.push(step);
        true
    }

    /// Mutable access to one step, e.g. to feed it from an [`ImageImport`].
    pub fn step_mut(&mut self, index: usize) -> Option<&mut Step> {
        self.detail.steps.get_mut(index)
    }

    /// Replace the step at `index`, deleting images the new version dropped.
    ///
    /// Returns `false` and changes nothing if the index is out of range or
    /// the new step has no description.
    pub fn replace_step(&mut self, index: usize, step: Step, assets: &AssetStore) -> bool {
        if step.description.trim().is_empty() {
            return false;
        }
        let Some(old) = self.detail.steps.get_mut(index) else {
            return false;
        };

        for path in old
            .image_paths
            .iter()
            .filter(|path| !step.image_paths.contains(*path))
        {
            assets.delete(path);
        }
        *old = step;
        true
    }

    /// Remove the step at `index` and delete its images.
    pub fn remove_step(&mut self, index: usize, assets: &AssetStore) -> Option<Step> {
        if index >= self.detail.steps.len() {
            return None;
        }
        let step = self.detail.steps.remove(index);
        for path in &step.image_paths {
            assets.delete(path);
        }
        Some(step)
    }

    /// Append a cooking note and return its id.
    pub fn add_note(
        &mut self,
        content: impl Into<String>,
        image_paths: Option<Vec<String>>,
    ) -> Uuid {
        let note = CookingNote::new(content, image_paths);
        let id = note.id;
        self.detail.notes.push(note);
        id
    }

    /// Remove a cooking note and delete its images.
    pub fn remove_note(&mut self, id: Uuid, assets: &AssetStore) -> bool {
        let Some(pos) = self.detail.notes.iter().position(|n| n.id == id) else {
            return false;
        };
        let note = self.detail.notes.remove(pos);
        for path in note.image_paths() {
            assets.delete(path);
        }
        true
    }

    /// Set or clear the cover photo, deleting the one it replaces.
    pub fn set_cover_image(&mut self, path: Option<String>, assets: &AssetStore) {
        if let Some(old) = self.detail.cover_image_path.take() {
            if path.as_deref() != Some(old.as_str()) {
                assets.delete(&old);
            }
        }
        self.detail.cover_image_path = path;
    }

    /// Write the draft to the repository.
    ///
    /// Stamps the update time, derives the summary from the detail and adds
    /// or updates the recipe with the full document.
    ///
    /// # Errors
    ///
    /// Returns whatever the repository's strict add or update returns.
    pub fn commit(mut self, repo: &mut RecipeRepository) -> Result<Mutation> {
        self.detail.touch();
        let summary = RecipeSummary::from_detail(&self.detail);
        if self.is_new {
            repo.try_add_recipe(summary, Some(self.detail))?;
            Ok(Mutation::Applied)
        } else {
            repo.try_update_recipe(summary, Some(self.detail))
        }
    }
}

fn push_non_blank(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    list.push(value.to_string());
    true
}

/// Background photo acquisition for one recipe.
///
/// Each spawned load produces raw bytes (or nothing, if the user's pick could
/// not be read). Loads run as async tasks. When a load is collected its bytes
/// are decoded, resized and written on a blocking thread so other loads keep
/// making progress. Paths are handed out in completion order, not spawn order.
///
/// Dropping an import aborts unfinished loads but leaks images whose save was
/// already running; call [`cancel`](Self::cancel) instead.
#[derive(Debug)]
pub struct ImageImport {
    owner: Uuid,
    assets: AssetStore,
    loads: JoinSet<Option<Vec<u8>>>,
    saves: JoinSet<Option<String>>,
}

impl ImageImport {
    /// Start an import for the recipe `owner`.
    #[must_use]
    pub fn new(owner: Uuid, assets: AssetStore) -> Self {
        Self {
            owner,
            assets,
            loads: JoinSet::new(),
            saves: JoinSet::new(),
        }
    }

    /// Queue one load. Must be called within a tokio runtime.
    pub fn spawn<F>(&mut self, load: F)
    where
        F: Future<Output = Option<Vec<u8>>> + Send + 'static,
    {
        self.loads.spawn(load);
    }

    /// Number of loads and saves not yet collected.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.loads.len() + self.saves.len()
    }

    fn start_save(&mut self, bytes: Vec<u8>) {
        let assets = self.assets.clone();
        let owner = self.owner;
        self.saves.spawn_blocking(move || assets.save(&bytes, owner));
    }

    /// Wait for the next successfully stored image.
    ///
    /// Returns `None` once every load and save has been collected.
    pub async fn next_path(&mut self) -> Option<String> {
        loop {
            tokio::select! {
                Some(joined) = self.saves.join_next(), if !self.saves.is_empty() => {
                    match joined {
                        Ok(Some(path)) => return Some(path),
                        Ok(None) => debug!("Image for recipe {} was not stored", self.owner),
                        Err(e) => warn!("Image save task failed: {}", e),
                    }
                }
                Some(joined) = self.loads.join_next(), if !self.loads.is_empty() => {
                    match joined {
                        Ok(Some(bytes)) => self.start_save(bytes),
                        Ok(None) => debug!("Image load for recipe {} produced nothing", self.owner),
                        Err(e) => warn!("Image load task failed: {}", e),
                    }
                }
                else => return None,
            }
        }
    }

    /// Append every stored path to `step` as it arrives; returns how many.
    pub async fn drain_into(&mut self, step: &mut Step) -> usize {
        let mut appended = 0;
        while let Some(path) = self.next_path().await {
            step.image_paths.push(path);
            appended += 1;
        }
        appended
    }

    /// Abandon the import.
    ///
    /// Unfinished loads are aborted. Saves that already started cannot be
    /// interrupted, so this waits for them and deletes what they wrote.
    pub async fn cancel(mut self) {
        self.loads.abort_all();
        while self.loads.join_next().await.is_some() {}

        while let Some(joined) = self.saves.join_next().await {
            if let Ok(Some(path)) = joined {
                self.assets.delete(&path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::oneshot;

    use crate::assets::tests::png_bytes;
    use crate::config::ImageConfig;

    fn create_test_repository() -> (tempfile::TempDir, RecipeRepository) {
        let temp = tempfile::tempdir().unwrap();
        let repo = RecipeRepository::open(temp.path(), ImageConfig::default());
        (temp, repo)
    }

    fn stored_width(assets: &AssetStore, path: &str) -> u32 {
        image::load_from_memory(&assets.load(path).unwrap())
            .unwrap()
            .width()
    }

    fn image_count(assets: &AssetStore) -> usize {
        std::fs::read_dir(assets.dir()).unwrap().count()
    }

    #[test]
    fn test_ingredients_and_seasonings() {
        let mut draft = RecipeDraft::new_recipe();
        assert!(draft.add_ingredient("  garlic "));
        assert!(!draft.add_ingredient("   "));
        assert!(draft.add_ingredient("ginger"));
        assert!(draft.add_seasoning("salt"));
        assert!(!draft.add_seasoning(""));

        draft.remove_ingredient("garlic");
        assert_eq!(draft.detail().ingredients, vec!["ginger".to_string()]);
        draft.remove_seasoning("salt");
        assert!(draft.detail().seasonings.is_empty());
    }

    #[test]
    fn test_add_step_ignores_blank() {
        let mut draft = RecipeDraft::new_recipe();
        assert!(!draft.add_step(Step::new(" ")));
        assert!(draft.add_step(Step::new("Boil water")));
        assert_eq!(draft.detail().steps.len(), 1);
    }

    #[test]
    fn test_replace_step_deletes_dropped_images() {
        let (_temp, repo) = create_test_repository();
        let assets = repo.assets();
        let mut draft = RecipeDraft::new_recipe();
        let kept = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        let dropped = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        draft.add_step(Step {
            description: "Knead".to_string(),
            image_paths: vec![kept.clone(), dropped.clone()],
        });

        let replacement = Step {
            description: "Knead for ten minutes".to_string(),
            image_paths: vec![kept.clone()],
        };
        assert!(!draft.replace_step(5, replacement.clone(), assets));
        assert!(draft.replace_step(0, replacement.clone(), assets));

        assert_eq!(draft.detail().steps, vec![replacement]);
        assert!(assets.load(&kept).is_some());
        assert!(assets.load(&dropped).is_none());
    }

    #[test]
    fn test_remove_step_deletes_its_images() {
        let (_temp, repo) = create_test_repository();
        let assets = repo.assets();
        let mut draft = RecipeDraft::new_recipe();
        let path = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        draft.add_step(Step {
            description: "Plate".to_string(),
            image_paths: vec![path.clone()],
        });

        assert!(draft.remove_step(3, assets).is_none());
        let removed = draft.remove_step(0, assets).unwrap();
        assert_eq!(removed.description, "Plate");
        assert!(draft.detail().steps.is_empty());
        assert!(assets.load(&path).is_none());
    }

    #[test]
    fn test_notes_and_cover_image() {
        let (_temp, repo) = create_test_repository();
        let assets = repo.assets();
        let mut draft = RecipeDraft::new_recipe();

        let note_image = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        let note = draft.add_note("Too salty", Some(vec![note_image.clone()]));
        assert!(draft.remove_note(note, assets));
        assert!(!draft.remove_note(note, assets));
        assert!(assets.load(&note_image).is_none());

        let first = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        let second = assets.save(&png_bytes(4, 4), draft.id()).unwrap();
        draft.set_cover_image(Some(first.clone()), assets);
        draft.set_cover_image(Some(first.clone()), assets);
        assert!(assets.load(&first).is_some());

        draft.set_cover_image(Some(second.clone()), assets);
        assert!(assets.load(&first).is_none());
        assert_eq!(draft.detail().cover_image_path.as_deref(), Some(second.as_str()));

        draft.set_cover_image(None, assets);
        assert!(assets.load(&second).is_none());
    }

    #[test]
    fn test_commit_new_then_edit() {
        let (_temp, mut repo) = create_test_repository();

        let mut draft = RecipeDraft::new_recipe();
        draft.detail_mut().name = "Scallion Pancake".to_string();
        draft.detail_mut().category = "Snacks".to_string();
        draft.add_ingredient("flour");
        draft.add_step(Step::new("Roll thin"));
        let id = draft.id();
        assert_eq!(draft.commit(&mut repo).unwrap(), Mutation::Applied);

        let summary = repo.get_summary(id).unwrap().clone();
        assert_eq!(summary.name, "Scallion Pancake");
        assert_eq!(summary.ingredients, vec!["flour".to_string()]);
        assert_eq!(summary.category, "Snacks");

        let mut draft = RecipeDraft::edit(repo.get_detail(id).unwrap());
        assert!(!draft.is_new());
        draft.add_seasoning("sesame oil");
        draft.add_ingredient("scallion");
        assert_eq!(draft.commit(&mut repo).unwrap(), Mutation::Applied);

        let detail = repo.get_detail(id).unwrap();
        assert_eq!(detail.seasonings, vec!["sesame oil".to_string()]);
        assert_eq!(detail.steps.len(), 1);
        assert_eq!(repo.get_summary(id).unwrap().ingredients.len(), 2);
        assert_eq!(repo.list_recipes().len(), 1);
    }

    #[test]
    fn test_commit_edit_of_deleted_recipe_is_unknown() {
        let (_temp, mut repo) = create_test_repository();
        let mut draft = RecipeDraft::new_recipe();
        draft.detail_mut().name = "Gone".to_string();
        let id = draft.id();
        draft.commit(&mut repo).unwrap();

        let stale = RecipeDraft::edit(repo.get_detail(id).unwrap());
        let summary = repo.get_summary(id).unwrap().clone();
        repo.delete_recipe(&summary);

        assert_eq!(stale.commit(&mut repo).unwrap(), Mutation::UnknownId);
        assert!(repo.get_detail(id).is_none());
    }

    #[tokio::test]
    async fn test_import_appends_stored_images() {
        let (_temp, repo) = create_test_repository();
        let owner = Uuid::new_v4();
        let mut import = ImageImport::new(owner, repo.assets().clone());

        import.spawn(async { Some(png_bytes(4, 4)) });
        import.spawn(async { None });
        import.spawn(async { Some(b"not an image".to_vec()) });
        import.spawn(async { Some(png_bytes(6, 6)) });
        assert_eq!(import.pending(), 4);

        let mut step = Step::new("Sear");
        assert_eq!(import.drain_into(&mut step).await, 2);
        assert_eq!(import.pending(), 0);
        assert_eq!(step.image_paths.len(), 2);
        for path in &step.image_paths {
            assert!(repo.assets().load(path).is_some());
        }
    }

    #[tokio::test]
    async fn test_import_yields_in_completion_order() {
        let (_temp, repo) = create_test_repository();
        let assets = repo.assets().clone();
        let mut import = ImageImport::new(Uuid::new_v4(), assets.clone());

        let (slow_tx, slow_rx) = oneshot::channel::<Vec<u8>>();
        let (fast_tx, fast_rx) = oneshot::channel::<Vec<u8>>();
        import.spawn(async move { slow_rx.await.ok() });
        import.spawn(async move { fast_rx.await.ok() });

        fast_tx.send(png_bytes(6, 6)).unwrap();
        let first = import.next_path().await.unwrap();
        slow_tx.send(png_bytes(4, 4)).unwrap();
        let second = import.next_path().await.unwrap();

        assert_eq!(stored_width(&assets, &first), 6);
        assert_eq!(stored_width(&assets, &second), 4);
        assert!(import.next_path().await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_discards_everything() {
        let (_temp, repo) = create_test_repository();
        let assets = repo.assets().clone();
        let mut import = ImageImport::new(Uuid::new_v4(), assets.clone());

        import.spawn(async { Some(png_bytes(4, 4)) });
        import.spawn(std::future::pending());
        tokio::task::yield_now().await;

        import.cancel().await;
        assert_eq!(image_count(&assets), 0);
    }

    fn downscaling_store(temp: &tempfile::TempDir) -> AssetStore {
        let settings = ImageConfig {
            jpeg_quality: 80,
            max_dimension: 64,
        };
        AssetStore::new(temp.path(), settings)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_waits_for_running_saves() {
        let temp = tempfile::tempdir().unwrap();
        let assets = downscaling_store(&temp);
        let mut import = ImageImport::new(Uuid::new_v4(), assets.clone());

        import.start_save(png_bytes(1024, 768));
        import.start_save(png_bytes(4, 4));
        import.spawn(std::future::pending());
        assert_eq!(import.pending(), 3);

        import.cancel().await;
        assert_eq!(image_count(&assets), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_save_does_not_block_other_loads() {
        let temp = tempfile::tempdir().unwrap();
        let assets = downscaling_store(&temp);
        let mut import = ImageImport::new(Uuid::new_v4(), assets.clone());

        let (tx, rx) = oneshot::channel::<Vec<u8>>();
        import.spawn(async { Some(png_bytes(1024, 768)) });
        import.spawn(async move { rx.await.ok() });
        tx.send(png_bytes(8, 8)).unwrap();

        let mut step = Step::new("Plate");
        assert_eq!(import.drain_into(&mut step).await, 2);

        let mut widths: Vec<u32> = step
            .image_paths
            .iter()
            .map(|path| stored_width(&assets, path))
            .collect();
        widths.sort_unstable();
        assert_eq!(widths, vec![8, 64]);
    }
}
