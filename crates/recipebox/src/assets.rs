//! Image asset store.
//!
//! Photos are written as JPEG files into the images directory of a storage
//! root. The store hands back the file path as a string and keeps no record of
//! who references it; detail documents carry the paths.

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::config::ImageConfig;
use crate::error::{Error, Result};

/// Durable storage for recipe photos.
///
/// Cheap to clone; clones write to the same directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
    settings: ImageConfig,
}

impl AssetStore {
    /// Store writing into `dir` with the given encoding settings.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, settings: ImageConfig) -> Self {
        Self {
            dir: dir.into(),
            settings,
        }
    }

    /// The images directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a photo for a recipe and return the stored path.
    ///
    /// Returns `None` if the bytes are not a decodable image or the write
    /// fails; the failure is logged. Callers must not record a path they did
    /// not get back.
    #[must_use]
    pub fn save(&self, image_bytes: &[u8], owner_id: Uuid) -> Option<String> {
        match self.try_save(image_bytes, owner_id) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Error saving image for recipe {}: {}", owner_id, e);
                None
            }
        }
    }

    /// Strict form of [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Image`] if the bytes cannot be decoded or re-encoded
    /// and [`Error::FileWrite`] if the file cannot be written.
    pub fn try_save(&self, image_bytes: &[u8], owner_id: Uuid) -> Result<String> {
        let encoded = self.encode(image_bytes)?;

        let path = self.dir.join(format!("{owner_id}_{}.jpg", Uuid::new_v4()));
        std::fs::write(&path, encoded).map_err(|source| Error::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!("Saved image at {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    /// Read a stored photo. Missing or unreadable files yield `None`.
    #[must_use]
    pub fn load(&self, path: &str) -> Option<Vec<u8>> {
        match self.try_load(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!("Error loading image: {}", e);
                None
            }
        }
    }

    /// Strict form of [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be read.
    pub fn try_load(&self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|source| Error::FileRead {
            path: PathBuf::from(path),
            source,
        })
    }

    /// Remove a stored photo, best effort.
    ///
    /// Deleting a path that does not exist is not an error.
    pub fn delete(&self, path: &str) {
        if let Err(e) = self.try_delete(path) {
            warn!("Error deleting image: {}", e);
        }
    }

    /// Strict form of [`delete`](Self::delete). A missing file counts as
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRemove`] for any failure other than the file not
    /// existing.
    pub fn try_delete(&self, path: &str) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Deleted image at {}", path);
                Ok(())
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::FileRemove {
                path: PathBuf::from(path),
                source,
            }),
        }
    }

    /// Decode, downscale if needed, and re-encode as JPEG.
    fn encode(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let mut img = image::load_from_memory(image_bytes)?;
        let (width, height) = (img.width(), img.height());

        let max = self.settings.max_dimension;
        if max > 0 && (width > max || height > max) {
            img = img.resize(max, max, FilterType::Lanczos3);
        }

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.settings.jpeg_quality)
            .encode_image(&img.to_rgb8())?;
        trace!(
            "Encoded {}x{} image as {}x{} JPEG, {} -> {} bytes",
            width,
            height,
            img.width(),
            img.height(),
            image_bytes.len(),
            buf.len()
        );
        Ok(buf)
    }
}
