//! # Storage Layer
//!
//! A catalog entry lives in two places: its metadata in a [`DocumentStore`]
//! and its cover image in an [`ImageStore`]. Both are addressed by the same
//! identity key ([`BookKey`]), so the two namespaces mirror each other.
//!
//! ## Storage Layout
//!
//! ```text
//! books/                          # document root
//! └── Palacio/
//!     └── R.J./
//!         └── Wonder.json         # {"title", "author": {...}, "cover"}
//! covers/                         # image root
//! └── Palacio/
//!     └── R.J./
//!         └── Wonder.png
//! ```
//!
//! Path segments are encoded by [`paths`]; see there for the rules.
//!
//! ## Overwrite by Key
//!
//! Saving a book whose key already exists replaces the existing entry in
//! both stores. There is never more than one entry per key.
//!
//! ## Caching
//!
//! [`fs::FsDocumentStore`] keeps every record it found on disk in memory.
//! The cache is filled on first read and rebuilt wholesale after each
//! successful `save`/`delete`/`edit`. Changes made to the directory tree by
//! other processes are not noticed until the next mutation.
//!
//! ## Implementations
//!
//! - [`fs::FsDocumentStore`] / [`images::FsImageStore`]: local filesystem.
//! - [`memory::MemDocumentStore`] / [`memory::MemImageStore`]: in-memory, for
//!   testing logic without filesystem I/O and for simulating write failures.

use crate::error::{CatalogError, Result};
use crate::filter::{self, BookQuery};
use crate::model::{Author, Book, BookKey};
use std::path::PathBuf;

pub mod fs;
pub mod images;
pub mod memory;
pub mod paths;

/// Persistence for book metadata.
pub trait DocumentStore {
    /// All persisted books, ordered by identity key.
    fn list(&self) -> Result<Vec<Book>>;

    /// Whether an entry exists for `key`.
    fn contains(&self, key: &BookKey) -> Result<bool>;

    /// Save a book, replacing any entry with the same key.
    fn save(&mut self, book: &Book) -> Result<()>;

    /// Delete the entry for the book's key. Fails with `NotFound` if absent.
    fn delete(&mut self, book: &Book) -> Result<()>;

    /// Whether two distinct keys address the same stored entry.
    ///
    /// Only possible when the backing namespace folds keys together, as a
    /// case-insensitive filesystem does.
    fn aliases(&self, _a: &BookKey, _b: &BookKey) -> Result<bool> {
        Ok(false)
    }

    /// The persisted book for `key`, if any.
    fn get(&self, key: &BookKey) -> Result<Option<Book>> {
        Ok(self.list()?.into_iter().find(|b| &b.key() == key))
    }

    /// Replace `old` with `new`.
    ///
    /// With `preserve_cover`, `new` is stored with the cover reference of the
    /// record persisted under `old`'s key. The new entry is written first and
    /// the old one removed afterwards, so an interruption leaves both rather
    /// than neither. When both books share a key, or their keys alias, the
    /// save alone is the whole edit.
    fn edit(&mut self, old: &Book, new: &Book, preserve_cover: bool) -> Result<()> {
        let old_key = old.key();
        let persisted = self
            .get(&old_key)?
            .ok_or_else(|| CatalogError::NotFound(old_key.clone()))?;

        let target = if preserve_cover {
            new.with_cover(persisted.cover)
        } else {
            new.clone()
        };
        let new_key = target.key();
        let aliased = new_key != old_key && self.aliases(&old_key, &new_key)?;
        self.save(&target)?;

        if new_key != old_key && !aliased {
            self.delete(old)?;
        }
        Ok(())
    }

    fn find(&self, query: &BookQuery) -> Result<Vec<Book>> {
        Ok(query.apply(&self.list()?))
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<Book>> {
        Ok(filter::by_title(&self.list()?, title))
    }

    fn find_by_author(&self, author: &Author) -> Result<Vec<Book>> {
        Ok(filter::by_author(&self.list()?, author))
    }

    fn has_books(&self) -> Result<bool> {
        Ok(!self.list()?.is_empty())
    }
}

/// Persistence for cover images, keyed like [`DocumentStore`].
pub trait ImageStore {
    /// Store the book's cover, replacing any cover already stored for its key.
    fn save(&mut self, book: &Book) -> Result<()>;

    /// Move the stored cover from `old`'s key to `new`'s key.
    ///
    /// With `preserve_cover` the cover already stored for `old` is reused;
    /// otherwise `new.cover` is stored. The old cover is removed last.
    fn edit(&mut self, old: &Book, new: &Book, preserve_cover: bool) -> Result<()>;

    /// Remove the stored cover. Fails with `NotFound` if absent.
    fn delete(&mut self, book: &Book) -> Result<()>;

    /// Absolute path of the stored cover.
    fn resolve_cover(&self, book: &Book) -> Result<PathBuf>;
}
