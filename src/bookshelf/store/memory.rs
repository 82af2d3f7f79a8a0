use super::{DocumentStore, ImageStore};
use crate::error::{CatalogError, Result};
use crate::model::{Book, BookKey};
use crate::validation::{has_supported_extension, validate_fields};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// In-memory metadata store for testing.
///
/// The `BTreeMap` keyed by [`BookKey`] gives the same ordering and the same
/// one-entry-per-key guarantee as the filesystem store.
#[derive(Default)]
pub struct MemDocumentStore {
    books: BTreeMap<BookKey, Book>,
    simulate_write_error: Cell<bool>,
}

impl MemDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(CatalogError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl DocumentStore for MemDocumentStore {
    fn list(&self) -> Result<Vec<Book>> {
        Ok(self.books.values().cloned().collect())
    }

    fn contains(&self, key: &BookKey) -> Result<bool> {
        Ok(self.books.contains_key(key))
    }

    fn save(&mut self, book: &Book) -> Result<()> {
        validate_fields(book)?;
        self.check_writable()?;
        self.books.insert(book.key(), book.clone());
        Ok(())
    }

    fn delete(&mut self, book: &Book) -> Result<()> {
        let key = book.key();
        if !self.books.contains_key(&key) {
            return Err(CatalogError::NotFound(key));
        }
        self.check_writable()?;
        self.books.remove(&key);
        Ok(())
    }
}

/// In-memory cover store for testing.
///
/// Remembers which cover reference was stored for each key; no bytes are
/// copied and sources are not checked for existence.
#[derive(Default)]
pub struct MemImageStore {
    covers: BTreeMap<BookKey, String>,
    simulate_write_error: Cell<bool>,
}

impl MemImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// The cover reference stored for `key`, if any.
    pub fn stored_cover(&self, key: &BookKey) -> Option<&str> {
        self.covers.get(key).map(String::as_str)
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(CatalogError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl ImageStore for MemImageStore {
    fn save(&mut self, book: &Book) -> Result<()> {
        if !has_supported_extension(&book.cover) {
            return Err(CatalogError::Format(book.cover.clone()));
        }
        self.check_writable()?;
        self.covers.insert(book.key(), book.cover.clone());
        Ok(())
    }

    fn edit(&mut self, old: &Book, new: &Book, preserve_cover: bool) -> Result<()> {
        let old_key = old.key();
        let new_key = new.key();
        let stored = self
            .covers
            .get(&old_key)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(old_key.clone()))?;

        if preserve_cover {
            self.check_writable()?;
            self.covers.insert(new_key.clone(), stored);
        } else {
            self.save(new)?;
        }

        if old_key != new_key {
            self.covers.remove(&old_key);
        }
        Ok(())
    }

    fn delete(&mut self, book: &Book) -> Result<()> {
        let key = book.key();
        if !self.covers.contains_key(&key) {
            return Err(CatalogError::NotFound(key));
        }
        self.check_writable()?;
        self.covers.remove(&key);
        Ok(())
    }

    fn resolve_cover(&self, book: &Book) -> Result<PathBuf> {
        let key = book.key();
        let cover = self
            .covers
            .get(&key)
            .ok_or_else(|| CatalogError::NotFound(key.clone()))?;
        let ext = std::path::Path::new(cover)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(PathBuf::from(format!(
            "memory://covers/{}/{}/{}.{}",
            key.last_name, key.first_name, key.title, ext
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Author;

    fn book(title: &str, cover: &str) -> Book {
        Book::new(title, Author::new("A", "Author"), cover)
    }

    #[test]
    fn documents_overwrite_by_key() {
        let mut store = MemDocumentStore::new();
        store.save(&book("T", "a.png")).unwrap();
        store.save(&book("T", "b.png")).unwrap();
        assert_eq!(store.list().unwrap(), vec![book("T", "b.png")]);
    }

    #[test]
    fn documents_simulated_error_keeps_state() {
        let mut store = MemDocumentStore::new();
        store.save(&book("T", "a.png")).unwrap();
        store.set_simulate_write_error(true);

        assert!(store.save(&book("U", "a.png")).is_err());
        assert!(store.delete(&book("T", "a.png")).is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn images_preserving_edit_carries_old_reference() {
        let mut store = MemImageStore::new();
        store.save(&book("T", "old.gif")).unwrap();
        store
            .edit(&book("T", "old.gif"), &book("U", "new.png"), true)
            .unwrap();

        assert_eq!(store.stored_cover(&book("T", "").key()), None);
        assert_eq!(store.stored_cover(&book("U", "").key()), Some("old.gif"));
        let path = store.resolve_cover(&book("U", "new.png")).unwrap();
        assert_eq!(path, PathBuf::from("memory://covers/Author/A/U.gif"));
    }

    #[test]
    fn images_reject_unsupported_format() {
        let mut store = MemImageStore::new();
        let err = store.save(&book("T", "scan.tiff")).unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
    }
}
