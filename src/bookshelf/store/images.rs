use super::paths::{self, ensure_dir, prune_empty_dirs, same_file, temp_path};
use super::ImageStore;
use crate::error::{CatalogError, Result};
use crate::model::{Book, BookKey};
use crate::validation::{has_supported_extension, SUPPORTED_COVER_EXTENSIONS};
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed cover store.
///
/// Source covers are read relative to `app_root`; stored copies live under
/// `root` with the lower-cased source extension.
pub struct FsImageStore {
    root: PathBuf,
    app_root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, app_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            app_root: app_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The stored cover for `key`, whichever supported extension it has.
    fn find_cover(&self, key: &BookKey) -> Result<Option<PathBuf>> {
        for ext in SUPPORTED_COVER_EXTENSIONS {
            let path = paths::entry_path(&self.root, key, ext)?;
            if path.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Copies `source` in as the cover for `key`.
    ///
    /// The copy goes to a temp file first, so a source that is itself the
    /// stored cover survives the removal of the previous entry.
    fn store_from(&self, key: &BookKey, source: &Path, ext: &str) -> Result<()> {
        let dir = paths::key_dir(&self.root, key)?;
        let target = dir.join(paths::entry_file_name(key, ext)?);
        ensure_dir(&dir)?;

        let tmp = temp_path(&dir);
        if let Err(e) = fs::copy(source, &tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(CatalogError::Io(e));
        }

        // Overwrite by key: drop covers stored under another extension
        for other in SUPPORTED_COVER_EXTENSIONS.iter().filter(|e| **e != ext) {
            let stale = paths::entry_path(&self.root, key, other)?;
            if stale.is_file() {
                fs::remove_file(&stale).map_err(CatalogError::Io)?;
                log::debug!("removed previous cover {}", stale.display());
            }
        }

        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(CatalogError::Io(e));
        }
        log::info!("stored cover for {} at {}", key, target.display());
        Ok(())
    }

    fn remove_cover(&self, key: &BookKey) -> Result<()> {
        let path = self
            .find_cover(key)?
            .ok_or_else(|| CatalogError::NotFound(key.clone()))?;
        fs::remove_file(&path).map_err(CatalogError::Io)?;
        if let Some(dir) = path.parent() {
            prune_empty_dirs(&self.root, dir)?;
        }
        log::info!("removed cover for {}", key);
        Ok(())
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

impl ImageStore for FsImageStore {
    fn save(&mut self, book: &Book) -> Result<()> {
        if !has_supported_extension(&book.cover) {
            return Err(CatalogError::Format(book.cover.clone()));
        }
        let ext = book
            .cover_extension()
            .ok_or_else(|| CatalogError::Format(book.cover.clone()))?;

        let source = self.app_root.join(&book.cover);
        if !source.is_file() {
            return Err(CatalogError::Validation(format!(
                "cover file not found: {}",
                source.display()
            )));
        }

        self.store_from(&book.key(), &source, &ext)
    }

    fn edit(&mut self, old: &Book, new: &Book, preserve_cover: bool) -> Result<()> {
        let old_key = old.key();
        let new_key = new.key();
        let stored = self
            .find_cover(&old_key)?
            .ok_or_else(|| CatalogError::NotFound(old_key.clone()))?;
        // Keys that differ only where the filesystem folds them share one file
        let aliased = old_key != new_key
            && self
                .find_cover(&new_key)?
                .is_some_and(|current| same_file(&stored, &current));

        if preserve_cover {
            if old_key == new_key || aliased {
                return Ok(());
            }
            let ext = lowercase_extension(&stored)
                .ok_or_else(|| CatalogError::Format(stored.display().to_string()))?;
            self.store_from(&new_key, &stored, &ext)?;
        } else {
            self.save(new)?;
        }

        if old_key != new_key && !aliased {
            self.remove_cover(&old_key)?;
        }
        Ok(())
    }

    fn delete(&mut self, book: &Book) -> Result<()> {
        self.remove_cover(&book.key())
    }

    fn resolve_cover(&self, book: &Book) -> Result<PathBuf> {
        let key = book.key();
        let path = self
            .find_cover(&key)?
            .ok_or(CatalogError::NotFound(key))?;
        fs::canonicalize(&path).map_err(CatalogError::Io)
    }
}
