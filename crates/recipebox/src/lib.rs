//! `recipebox` - Persistence for a personal recipe collection
//!
//! This library keeps a recipe index, one detail document per recipe and the
//! photos those documents reference, and keeps the three consistent.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assets;
pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;

pub use assets::AssetStore;
pub use config::{Config, ImageConfig};
pub use editor::{ImageImport, RecipeDraft};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{Category, CookingNote, RecipeDetail, RecipeSummary, Step, DEFAULT_CATEGORY};
pub use storage::{Mutation, RecipeRepository, StorageLayout};
