//! Library registry: one image per resolved dependency.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tern_session::SessionConfig;
use tracing::debug;

use crate::deserializer::ModuleDeserializer;
use crate::error::{LibraryError, Result};
use crate::image::LibraryImage;

/// Shares library images across a compilation.
///
/// Paths are canonicalized, so `lib/../lib/core.tlib` and `lib/core.tlib`
/// resolve to the same image and are materialized once.
pub struct LibraryRegistry<D: ModuleDeserializer> {
    config: Arc<SessionConfig>,
    deserializer: Arc<D>,
    images: RwLock<FxHashMap<PathBuf, Arc<LibraryImage<D>>>>,
}

impl<D: ModuleDeserializer> LibraryRegistry<D> {
    #[must_use]
    pub fn new(config: Arc<SessionConfig>, deserializer: D) -> Self {
        Self {
            config,
            deserializer: Arc::new(deserializer),
            images: RwLock::new(FxHashMap::default()),
        }
    }

    /// Return the image for `path`, opening it on first use.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Arc<LibraryImage<D>>> {
        let path = path.as_ref();
        let key = path.canonicalize().map_err(|e| LibraryError::from_io(path, &e))?;

        if let Some(image) = self.images.read().get(&key) {
            return Ok(Arc::clone(image));
        }

        let mut images = self.images.write();
        if let Some(image) = images.get(&key) {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(LibraryImage::open(
            key.clone(),
            Arc::clone(&self.config),
            Arc::clone(&self.deserializer),
        )?);
        images.insert(key, Arc::clone(&image));
        debug!(library = image.library_name(), total = images.len(), "registered library");
        Ok(image)
    }

    /// Return the image for `path` if it has already been opened.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<LibraryImage<D>>> {
        let key = path.as_ref().canonicalize().ok()?;
        self.images.read().get(&key).cloned()
    }

    /// Number of distinct libraries opened.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.read().is_empty()
    }

    /// All opened images, sorted by library name.
    pub fn libraries(&self) -> Vec<Arc<LibraryImage<D>>> {
        let mut all: Vec<_> = self.images.read().values().cloned().collect();
        all.sort_by(|a, b| a.library_name().cmp(b.library_name()));
        all
    }

    /// Session configuration shared by every image.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
