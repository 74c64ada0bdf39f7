//! Recipe data model.
//!
//! A recipe is stored twice: a lightweight [`RecipeSummary`] in the index and a
//! full [`RecipeDetail`] document. The summary's name, ingredients and category
//! are duplicated in the detail; [`RecipeDetail::apply_summary`] is the only
//! place that copies them across.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category assigned when none is chosen.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Names of the built-in category picklist.
const DEFAULT_CATEGORY_NAMES: [&str; 6] = [
    "Home Cooking",
    "Cold Dishes",
    "Soups",
    "Staples",
    "Snacks",
    "Desserts",
];

/// Index entry for a recipe, used by list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    /// Unique identifier, shared with the detail document.
    pub id: Uuid,
    /// Dish name.
    pub name: String,
    /// Ingredient names, in display order.
    pub ingredients: Vec<String>,
    /// Category name (a copy, not a reference to a [`Category`]).
    pub category: String,
    /// When the recipe was created.
    pub create_date: DateTime<Utc>,
}

impl RecipeSummary {
    /// Create a summary with a fresh id and the current time.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        ingredients: Vec<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients,
            category: category.into(),
            create_date: Utc::now(),
        }
    }

    /// Derive the index entry for a full detail document.
    #[must_use]
    pub fn from_detail(detail: &RecipeDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
            ingredients: detail.ingredients.clone(),
            category: detail.category.clone(),
            create_date: detail.create_date,
        }
    }

    /// Case-insensitive match against the name or the ingredient list.
    ///
    /// An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.ingredients.concat().to_lowercase().contains(&query)
    }
}

impl Default for RecipeSummary {
    fn default() -> Self {
        Self::new("", Vec::new(), DEFAULT_CATEGORY)
    }
}

/// Full recipe document, stored one file per recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    /// Same id as the owning summary; never changes.
    pub id: Uuid,
    /// Dish name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Cover photo, if any.
    pub cover_image_path: Option<String>,
    /// Ingredient names.
    pub ingredients: Vec<String>,
    /// Seasoning names.
    pub seasonings: Vec<String>,
    /// Method, in order.
    pub steps: Vec<Step>,
    /// Category name.
    pub category: String,
    /// Cooking notes, in the order they were added.
    pub notes: Vec<CookingNote>,
    /// When the recipe was created.
    pub create_date: DateTime<Utc>,
    /// When the document was last changed.
    pub update_date: DateTime<Utc>,
}

impl RecipeDetail {
    /// Build the default detail for a summary.
    ///
    /// Id, name, ingredients, category and creation date are copied verbatim;
    /// everything else starts empty.
    #[must_use]
    pub fn from_summary(summary: &RecipeSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name.clone(),
            description: String::new(),
            cover_image_path: None,
            ingredients: summary.ingredients.clone(),
            seasonings: Vec::new(),
            steps: Vec::new(),
            category: summary.category.clone(),
            notes: Vec::new(),
            create_date: summary.create_date,
            update_date: Utc::now(),
        }
    }

    /// Overlay the fields a summary owns onto this detail.
    ///
    /// Copies `name`, `ingredients` and `category`, then refreshes
    /// `update_date`. The id, description, cover image, seasonings, steps,
    /// notes and creation date are left alone. The update date never moves
    /// backwards, even if the clock does.
    pub fn apply_summary(&mut self, summary: &RecipeSummary) {
        self.name.clone_from(&summary.name);
        self.ingredients.clone_from(&summary.ingredients);
        self.category.clone_from(&summary.category);
        self.touch();
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.update_date = Utc::now().max(self.update_date);
    }

    /// Every image file this document references: cover, steps, then notes.
    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.cover_image_path
            .as_deref()
            .into_iter()
            .chain(
                self.steps
                    .iter()
                    .flat_map(|step| step.image_paths.iter())
                    .map(String::as_str),
            )
            .chain(self.notes.iter().flat_map(|note| note.image_paths()))
    }
}

/// One instruction in a recipe's method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// What to do.
    pub description: String,
    /// Photos for this step; empty rather than absent.
    #[serde(default)]
    pub image_paths: Vec<String>,
}

impl Step {
    /// Create a step without images.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            image_paths: Vec::new(),
        }
    }
}

/// A free-form annotation on a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingNote {
    /// Identifier, used to tell notes apart in an editor.
    pub id: Uuid,
    /// Note text.
    pub content: String,
    /// Optional photos.
    #[serde(default)]
    pub image_paths: Option<Vec<String>>,
    /// When the note was written.
    pub create_date: DateTime<Utc>,
}

impl CookingNote {
    /// Create a note stamped with the current time.
    #[must_use]
    pub fn new(content: impl Into<String>, image_paths: Option<Vec<String>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            image_paths,
            create_date: Utc::now(),
        }
    }

    /// The note's image paths, if any.
    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.image_paths.iter().flatten().map(String::as_str)
    }
}

/// An entry of the category picklist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Identifier.
    pub id: Uuid,
    /// Display name, copied into recipes that pick it.
    pub name: String,
}

impl Category {
    /// Create a category with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// The built-in picklist.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CATEGORY_NAMES
            .iter()
            .map(|name| Self::new(*name))
            .collect()
    }
}
