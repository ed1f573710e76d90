//! Кэш загруженных выгрузок по отпечатку содержимого

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::DatasetError;
use crate::preprocessing::normalization::{fingerprint, read_source};
use crate::preprocessing::DataNormalizer;
use crate::types::Dataset;

/// Источник перечитывается на каждый запрос, но разбирается заново только
/// если изменился SHA-256 содержимого.
pub struct DatasetCache {
    normalizer: DataNormalizer,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(normalizer: DataNormalizer) -> Self {
        Self {
            normalizer,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Dataset>, DatasetError> {
        let path = path.as_ref();
        let bytes = read_source(path)?;
        let digest = fingerprint(&bytes);

        if let Some(cached) = self.entries.get(path) {
            if cached.meta.fingerprint == digest {
                tracing::debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(cached));
            }
            tracing::info!("Source {} changed, reloading", path.display());
        }

        let dataset = match self.normalizer.load_bytes(&bytes, &path.display().to_string()) {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                // Устаревшая таблица не должна переживать неудачную перезагрузку
                self.entries.remove(path);
                return Err(e);
            }
        };
        self.entries.insert(path.to_path_buf(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn invalidate(&mut self, path: impl AsRef<Path>) -> bool {
        self.entries.remove(path.as_ref()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DataNormalizer::new())
    }
}
